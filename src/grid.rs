use crate::Coords;
use crate::term::Screen;

use log::debug;
use rand::Rng;

/// Width in terminal characters of a single board cell.
pub const CELL_WIDTH: usize = 3;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Cell {
    Empty,
    SnakeBody,
    SnakeHead,
    Food,
}

impl Cell {
    pub fn symbol(&self) -> &'static str {
        match self {
            Cell::Empty => " . ",
            Cell::SnakeBody => " * ",
            Cell::SnakeHead => " # ",
            Cell::Food => " & ",
        }
    }
}

/// The square board. Only the food position survives between renders,
/// the snake cells are rebuilt from `occupied` every frame.
pub struct Grid {
    size: usize,
    cells: Vec<Vec<Cell>>,
    occupied: Vec<Coords>,
    food: Option<Coords>,
}

impl Grid {
    pub fn new<R: Rng>(size: usize, rng: &mut R) -> Self {
        assert!(size > 0, "grid size must be positive");

        let mut grid = Grid {
            size,
            cells: vec![vec![Cell::Empty; size]; size],
            occupied: vec![],
            food: None,
        };
        grid.place_food(rng);
        grid
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Picks random cells until one is not covered by the snake. Never returns
    /// on a board the snake fills completely.
    pub fn place_food<R: Rng>(&mut self, rng: &mut R) {
        let food = loop {
            let candidate = (rng.gen_range(0..self.size), rng.gen_range(0..self.size));
            if !self.occupied.contains(&candidate) {
                break candidate;
            }
        };

        if let Some((row, col)) = self.food.take() {
            self.cells[row][col] = Cell::Empty;
        }
        self.cells[food.0][food.1] = Cell::Food;
        self.food = Some(food);

        debug!("Food placed at {:?}", food);
    }

    pub fn food_position(&self) -> Option<Coords> {
        self.food
    }

    pub fn is_head_on_food(&self, head: Coords) -> bool {
        self.food == Some(head)
    }

    pub fn is_occupied(&self, pos: Coords) -> bool {
        self.occupied.contains(&pos)
    }

    /// Replaces the set of cells covered by the snake, head last.
    pub fn occupy(&mut self, body: &[Coords]) {
        self.occupied.clear();
        self.occupied.extend_from_slice(body);
    }

    /// Brings a position that stepped at most one cell off the board back on
    /// from the opposite edge. Each axis is corrected on its own.
    pub fn wrap(&self, (row, col): (isize, isize)) -> Coords {
        (wrap_axis(row, self.size), wrap_axis(col, self.size))
    }

    pub fn render<S: Screen>(&mut self, screen: &mut S) -> crossterm::Result<()> {
        self.refresh_cells();

        for (row, cells) in self.cells.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                for (offset, ch) in cell.symbol().chars().enumerate() {
                    let x = col * CELL_WIDTH + offset;
                    screen.set_cell(x as u16, row as u16, ch)?;
                }
            }
        }

        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn refresh_cells(&mut self) {
        for row in self.cells.iter_mut() {
            for cell in row.iter_mut() {
                if *cell != Cell::Food {
                    *cell = Cell::Empty;
                }
            }
        }

        if let Some((&head, body)) = self.occupied.split_last() {
            for &(row, col) in body {
                self.cells[row][col] = Cell::SnakeBody;
            }
            self.cells[head.0][head.1] = Cell::SnakeHead;
        }
    }
}

fn wrap_axis(value: isize, size: usize) -> usize {
    let size = size as isize;

    if value < 0 {
        (size - 1) as usize
    } else if value > size - 1 {
        0
    } else {
        value as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::tests::BufferScreen;
    use rand::{rngs::StdRng, SeedableRng};

    impl Grid {
        fn cell(&self, (row, col): Coords) -> Cell {
            self.cells[row][col]
        }
    }

    #[test]
    fn new_grid_has_exactly_one_food() {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = Grid::new(10, &mut rng);

        let food_cells = grid.cells.iter().flatten().filter(|c| **c == Cell::Food).count();
        assert_eq!(food_cells, 1);

        let (row, col) = grid.food_position().unwrap();
        assert_eq!(grid.cell((row, col)), Cell::Food);
    }

    #[test]
    fn food_never_lands_on_the_snake() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut grid = Grid::new(3, &mut rng);

        // Leave a single free cell at (2, 2)
        let body: Vec<Coords> = (0..3)
            .flat_map(|row| (0..3).map(move |col| (row, col)))
            .filter(|pos| *pos != (2, 2))
            .collect();
        grid.occupy(&body);

        for _ in 0..20 {
            grid.place_food(&mut rng);
            assert_eq!(grid.food_position(), Some((2, 2)));
        }
    }

    #[test]
    fn replacing_food_clears_the_previous_cell() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut grid = Grid::new(2, &mut rng);
        grid.occupy(&[(0, 0), (0, 1)]);

        for _ in 0..10 {
            let before = grid.food_position().unwrap();
            grid.place_food(&mut rng);
            let after = grid.food_position().unwrap();

            assert!(!grid.is_occupied(after));
            if before != after {
                assert_eq!(grid.cell(before), Cell::Empty);
            }
            let food_cells = grid.cells.iter().flatten().filter(|c| **c == Cell::Food).count();
            assert_eq!(food_cells, 1);
        }
    }

    #[test]
    fn head_on_food() {
        let mut rng = StdRng::seed_from_u64(1);
        let grid = Grid::new(5, &mut rng);
        let food = grid.food_position().unwrap();

        assert!(grid.is_head_on_food(food));
        assert!(!grid.is_head_on_food(((food.0 + 1) % 5, food.1)));
    }

    #[test]
    fn wrap_corrects_each_axis() {
        let mut rng = StdRng::seed_from_u64(0);
        let grid = Grid::new(30, &mut rng);

        assert_eq!(grid.wrap((-1, 5)), (29, 5));
        assert_eq!(grid.wrap((30, 5)), (0, 5));
        assert_eq!(grid.wrap((5, -1)), (5, 29));
        assert_eq!(grid.wrap((5, 30)), (5, 0));
        assert_eq!(grid.wrap((12, 17)), (12, 17));
    }

    #[test]
    fn wrap_on_tiny_boards() {
        let mut rng = StdRng::seed_from_u64(0);

        let grid = Grid::new(2, &mut rng);
        assert_eq!(grid.wrap((-1, 2)), (1, 0));
        assert_eq!(grid.wrap((2, -1)), (0, 1));

        let grid = Grid::new(1, &mut rng);
        assert_eq!(grid.wrap((-1, 1)), (0, 0));
        assert_eq!(grid.wrap((1, -1)), (0, 0));
    }

    #[test]
    fn render_draws_snake_and_food() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut grid = Grid::new(4, &mut rng);
        grid.occupy(&[(1, 0), (1, 1), (1, 2)]);
        grid.place_food(&mut rng);
        let food = grid.food_position().unwrap();

        let mut screen = BufferScreen::new(4 * CELL_WIDTH, 4);
        grid.render(&mut screen).unwrap();

        assert_eq!(screen.line(1)[..9], *" *  *  # ");
        let food_col = food.1 * CELL_WIDTH;
        assert_eq!(screen.line(food.0)[food_col..food_col + 3], *" & ");

        let last_row = screen.line(3);
        for col in 0..4 {
            let cell = &last_row[col * CELL_WIDTH..(col + 1) * CELL_WIDTH];
            assert!(cell == " . " || cell == " & ", "unexpected cell {:?}", cell);
        }
    }

    #[test]
    fn render_forgets_old_snake_cells() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut grid = Grid::new(4, &mut rng);
        let mut screen = BufferScreen::new(4 * CELL_WIDTH, 4);

        grid.occupy(&[(3, 0), (3, 1)]);
        grid.render(&mut screen).unwrap();
        grid.occupy(&[(3, 1), (3, 2)]);
        grid.render(&mut screen).unwrap();

        if grid.food_position() != Some((3, 0)) {
            assert_eq!(grid.cell((3, 0)), Cell::Empty);
        }
        assert_eq!(grid.cell((3, 1)), Cell::SnakeBody);
        assert_eq!(grid.cell((3, 2)), Cell::SnakeHead);
    }
}
