use crate::Coords;
use crate::grid::Grid;
use Direction::*;
use MoveResult::*;

use log::info;
use rand::Rng;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    /// Unit step as (row, column).
    fn offset(&self) -> (isize, isize) {
        match self {
            Up => (-1, 0),
            Down => (1, 0),
            Left => (0, -1),
            Right => (0, 1),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum MoveResult {
    Moved { new_head: Coords },
    Ate { new_head: Coords },
    Crashed { new_head: Coords },
}

pub struct Snake {
    name: String,
    body: Vec<Coords>,
    direction: Direction,
}

impl Snake {
    pub fn new(name: &str) -> Self {
        let body = (0..4).map(|col| (0, col)).collect();
        Snake { name: name.to_string(), body, direction: Right }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Oldest cell first, head last.
    #[cfg(test)]
    pub fn body(&self) -> &[Coords] {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn head(&self) -> Coords {
        self.body[self.body.len() - 1]
    }

    /// Hands the body to the field so food placement can avoid it. Food that
    /// was placed before the snake existed gets moved out from under it.
    pub fn set_field<R: Rng>(&self, field: &mut Grid, rng: &mut R) {
        field.occupy(&self.body);

        if let Some(food) = field.food_position() {
            if field.is_occupied(food) {
                field.place_food(rng);
            }
        }
    }

    pub fn move_step<R: Rng>(&mut self, field: &mut Grid, rng: &mut R) -> MoveResult {
        let (row, col) = self.head();
        let (d_row, d_col) = self.direction.offset();
        let new_head = field.wrap((row as isize + d_row, col as isize + d_col));

        self.body.remove(0);
        self.body.push(new_head);
        field.occupy(&self.body);

        if !self.is_alive() {
            info!("{} crashed into itself at {:?}", self.name, new_head);
            return Crashed { new_head };
        }

        if field.is_head_on_food(new_head) {
            self.level_up(field);
            field.place_food(rng);
            info!("{} ate at {:?}, length is now {}", self.name, new_head, self.len());
            return Ate { new_head };
        }

        Moved { new_head }
    }

    pub fn set_direction(&mut self, new_direction: Direction) {
        if new_direction != self.direction.opposite() {
            self.direction = new_direction;
        }
    }

    #[cfg(test)]
    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    /// Adds a cell behind the tail, continuing the line through the two
    /// oldest cells. The head is left where it is.
    pub fn level_up(&mut self, field: &mut Grid) {
        let size = field.size() as isize;
        let (a, b) = match self.body.as_slice() {
            [a, b, ..] => (*a, *b),
            [a] => (*a, self.head()),
            [] => return,
        };

        let step_away = |from: usize, to: usize| {
            let delta = from as isize - to as isize;
            // Neighbours across the wrap edge sit size - 1 apart
            if delta > 1 {
                -1
            } else if delta < -1 {
                1
            } else {
                delta
            }
        };

        let tail = if size > 1 {
            let d_row = step_away(a.0, b.0);
            let d_col = step_away(a.1, b.1);
            field.wrap((a.0 as isize + d_row, a.1 as isize + d_col))
        } else {
            a
        };

        self.body.insert(0, tail);
        field.occupy(&self.body);
    }

    pub fn is_alive(&self) -> bool {
        match self.body.split_last() {
            Some((head, rest)) => !rest.contains(head),
            None => true,
        }
    }

    #[cfg(test)]
    pub fn with_body(body: Vec<Coords>, direction: Direction) -> Self {
        Snake { name: "test".to_string(), body, direction }
    }
}
