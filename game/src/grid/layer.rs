use crate::position::Position;

/// One grid-shaped overlay. Reads outside the grid yield `T::default()`,
/// writes outside the grid are dropped.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Layer<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> Layer<T> {
    pub(crate) fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }

    pub(crate) fn get(&self, pos: Position) -> T {
        if pos.in_bounds((self.width, self.height)) {
            self.data[pos.index(self.width)]
        } else {
            T::default()
        }
    }

    pub(crate) fn get_mut(&mut self, pos: Position) -> Option<&mut T> {
        if pos.in_bounds((self.width, self.height)) {
            self.data.get_mut(pos.index(self.width))
        } else {
            None
        }
    }

    pub(crate) fn set(&mut self, pos: Position, value: T) {
        if let Some(slot) = self.get_mut(pos) {
            *slot = value;
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (Position, T)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(move |(i, &value)| (Position::new(i % self.width, i / self.width), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_reads_default_and_writes_are_dropped() {
        let mut layer: Layer<u8> = Layer::new(2, 2);
        layer.set(Position { x: -1, y: 0 }, 5);
        layer.set(Position::new(2, 0), 5);
        assert_eq!(layer.get(Position { x: -1, y: 0 }), 0);
        assert!(layer.iter().all(|(_, v)| v == 0));

        layer.set(Position::new(1, 1), 3);
        assert_eq!(layer.get(Position::new(1, 1)), 3);
    }
}
