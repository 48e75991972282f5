//! Controllers that turn sensor readings into action preferences.
//!
//! The simulation only knows the [`Controller`] contract: a fixed-size vector
//! of quantized sensor distances goes in, one score per [`Action`] comes out.
//! [`Brain`] is the evolvable implementation, a plain MLP with tanh layers.
//!
//! [`Action`]: super::vehicle::Action

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::sensor::SensorVector;
use super::vehicle::ACTION_COUNT;

pub mod mlp;

pub use mlp::Mlp;

/// Maps a sensor vector to one score per action.
///
/// Controllers are queried once per living car per tick, possibly from several
/// threads at once, and must not depend on call order.
pub trait Controller: Sync {
    /// Scores every action for the given quantized sensor distances.
    fn evaluate(&self, sensors: &SensorVector) -> [f32; ACTION_COUNT];
}

impl<C: Controller + ?Sized> Controller for &C {
    fn evaluate(&self, sensors: &SensorVector) -> [f32; ACTION_COUNT] {
        (**self).evaluate(sensors)
    }
}

impl<C: Controller + ?Sized> Controller for Box<C> {
    fn evaluate(&self, sensors: &SensorVector) -> [f32; ACTION_COUNT] {
        (**self).evaluate(sensors)
    }
}

/// Fixed-topology neural network used as a car controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brain {
    /// Ordered layers from input to output.
    pub layers: Vec<Mlp>,
}

impl Brain {
    /// Creates a brain with random weights for the given layer sizes.
    ///
    /// `layer_sizes` lists the input width, any hidden widths, then the output
    /// width, so it needs at least two entries.
    pub fn new(layer_sizes: &[usize], scale: f32) -> Self {
        let layers = layer_sizes
            .windows(2)
            .map(|pair| Mlp::new_random(pair[0], pair[1], scale))
            .collect();

        Self { layers }
    }

    /// Widths of every layer boundary, input first.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes: Vec<usize> = self.layers.iter().map(Mlp::input_size).collect();
        if let Some(last) = self.layers.last() {
            sizes.push(last.output_size());
        }
        sizes
    }

    /// Whether the layers chain from `inputs` values to `outputs` scores.
    pub fn fits(&self, inputs: usize, outputs: usize) -> bool {
        let (Some(first), Some(last)) = (self.layers.first(), self.layers.last()) else {
            return false;
        };
        first.input_size() == inputs
            && last.output_size() == outputs
            && self
                .layers
                .iter()
                .all(|layer| layer.biases.len() == layer.output_size())
            && self
                .layers
                .windows(2)
                .all(|pair| pair[0].output_size() == pair[1].input_size())
    }

    /// Total number of weights and biases.
    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(Mlp::parameter_count).sum()
    }

    /// Runs a forward pass through every layer.
    #[inline]
    pub fn think(&self, inputs: &Array1<f32>) -> Array1<f32> {
        self.layers
            .iter()
            .fold(inputs.clone(), |activation, layer| layer.forward(&activation))
    }

    /// Creates a new brain by averaging two parent brains.
    pub fn crossover(parent1: &Brain, parent2: &Brain) -> Self {
        Self::crossover_weighted(parent1, parent2, 0.5)
    }

    /// Creates a new brain by weighted averaging of two parents.
    ///
    /// `weight1` applies to `parent1`, `1 - weight1` to `parent2`. Parents with
    /// different layouts cannot be blended, so `parent1` is cloned instead.
    pub fn crossover_weighted(parent1: &Brain, parent2: &Brain, weight1: f32) -> Self {
        if parent1.layer_sizes() != parent2.layer_sizes() {
            return parent1.clone();
        }
        let layers = parent1
            .layers
            .iter()
            .zip(&parent2.layers)
            .map(|(layer1, layer2)| Mlp::crossover_weighted(layer1, layer2, weight1))
            .collect();
        Self { layers }
    }

    /// Mutates all parameters in the brain.
    pub fn mutate(&mut self, mutation_scale: f32) {
        for layer in &mut self.layers {
            layer.mutate(mutation_scale);
        }
    }

    /// Euclidean distance between two brains' parameters.
    ///
    /// Brains with different layouts are infinitely far apart.
    pub fn distance(brain1: &Brain, brain2: &Brain) -> f32 {
        if brain1.layer_sizes() != brain2.layer_sizes() {
            return f32::INFINITY;
        }
        brain1
            .layers
            .iter()
            .zip(&brain2.layers)
            .map(|(a, b)| a.squared_distance(b))
            .sum::<f32>()
            .sqrt()
    }
}

impl Controller for Brain {
    fn evaluate(&self, sensors: &SensorVector) -> [f32; ACTION_COUNT] {
        let inputs = Array1::from_iter(sensors.iter().copied());
        let outputs = self.think(&inputs);

        let mut scores = [0.0; ACTION_COUNT];
        for (score, &value) in scores.iter_mut().zip(outputs.iter()) {
            *score = value;
        }
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::sensor::SENSOR_COUNT;

    fn layout() -> Vec<usize> {
        vec![SENSOR_COUNT, 6, ACTION_COUNT]
    }

    #[test]
    fn reports_layer_sizes() {
        let brain = Brain::new(&layout(), 0.5);
        assert_eq!(brain.layer_sizes(), layout());
        assert_eq!(brain.parameter_count(), 5 * 6 + 6 + 6 * 4 + 4);
    }

    #[test]
    fn evaluate_is_bounded_by_tanh() {
        let brain = Brain::new(&layout(), 2.0);
        let scores = brain.evaluate(&[10.0, 3.0, 0.0, 7.0, 1.0]);
        assert!(scores.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn zero_brain_outputs_zero() {
        let brain = Brain {
            layers: vec![Mlp::zeros(SENSOR_COUNT, 3), Mlp::zeros(3, ACTION_COUNT)],
        };
        assert_eq!(brain.evaluate(&[1.0; SENSOR_COUNT]), [0.0; ACTION_COUNT]);
    }

    #[test]
    fn crossover_of_identical_parents_is_identity() {
        let parent = Brain::new(&layout(), 1.0);
        let child = Brain::crossover(&parent, &parent);
        assert!(Brain::distance(&parent, &child) < 1e-5);
    }

    #[test]
    fn mutation_moves_parameters() {
        let parent = Brain::new(&layout(), 1.0);
        let mut child = parent.clone();
        child.mutate(0.1);
        let distance = Brain::distance(&parent, &child);
        assert!(distance > 0.0);
        assert!(distance.is_finite());
    }

    #[test]
    fn fits_checks_both_ends_and_the_chain() {
        let brain = Brain::new(&layout(), 1.0);
        assert!(brain.fits(SENSOR_COUNT, ACTION_COUNT));
        assert!(!brain.fits(3, ACTION_COUNT));
        assert!(!brain.fits(SENSOR_COUNT, 2));

        let broken = Brain {
            layers: vec![Mlp::zeros(SENSOR_COUNT, 3), Mlp::zeros(4, ACTION_COUNT)],
        };
        assert!(!broken.fits(SENSOR_COUNT, ACTION_COUNT));
        assert!(!Brain { layers: Vec::new() }.fits(SENSOR_COUNT, ACTION_COUNT));
    }

    #[test]
    fn mismatched_layouts_do_not_blend() {
        let a = Brain::new(&layout(), 1.0);
        let b = Brain::new(&[SENSOR_COUNT, ACTION_COUNT], 1.0);
        assert_eq!(Brain::crossover(&a, &b), a);
        assert!(Brain::distance(&a, &b).is_infinite());
    }
}
