use chase_engine::RandomSource;

/// Replays a fixed sequence of unit samples, cycling when exhausted.
pub struct Scripted {
    values: Vec<f32>,
    cursor: usize,
}

impl Scripted {
    pub fn new(values: &[f32]) -> Self {
        assert!(!values.is_empty(), "scripted source needs at least one value");
        Self {
            values: values.to_vec(),
            cursor: 0,
        }
    }

    pub fn constant(value: f32) -> Self {
        Self::new(&[value])
    }

    /// Samples handed out so far.
    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for Scripted {
    fn next_f32(&mut self) -> f32 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
