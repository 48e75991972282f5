//! Dense layer of a multi-layer perceptron.

use ndarray::{Array1, Array2, Zip};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use serde::{Deserialize, Serialize};

/// A fully connected layer with tanh activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mlp {
    /// Weight matrix (`output_size` × `input_size`).
    pub weights: Array2<f32>,
    /// Bias vector (`output_size`).
    pub biases: Array1<f32>,
}

impl Mlp {
    /// Creates a layer with weights and biases drawn from `[-scale, scale)`.
    pub fn new_random(input_size: usize, output_size: usize, scale: f32) -> Self {
        Self {
            weights: Array2::random((output_size, input_size), Uniform::new(-scale, scale)),
            biases: Array1::random(output_size, Uniform::new(-scale, scale)),
        }
    }

    /// Creates a layer with all parameters zero.
    pub fn zeros(input_size: usize, output_size: usize) -> Self {
        Self {
            weights: Array2::zeros((output_size, input_size)),
            biases: Array1::zeros(output_size),
        }
    }

    /// Number of inputs the layer expects.
    pub fn input_size(&self) -> usize {
        self.weights.ncols()
    }

    /// Number of outputs the layer produces.
    pub fn output_size(&self) -> usize {
        self.weights.nrows()
    }

    /// Number of trainable parameters.
    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    /// Forward pass: `tanh(W · x + b)`.
    #[inline]
    pub fn forward(&self, inputs: &Array1<f32>) -> Array1<f32> {
        let mut output = self.weights.dot(inputs);
        output += &self.biases;
        output.mapv_inplace(f32::tanh);
        output
    }

    /// Adds uniform noise in `[-mutation_scale, mutation_scale)` to every parameter.
    pub fn mutate(&mut self, mutation_scale: f32) {
        let noise = Uniform::new(-mutation_scale, mutation_scale);
        self.weights += &Array2::random(self.weights.dim(), noise);
        self.biases += &Array1::random(self.biases.len(), noise);
    }

    /// Blends two parents: `weight1 * parent1 + (1 - weight1) * parent2`.
    pub fn crossover_weighted(parent1: &Mlp, parent2: &Mlp, weight1: f32) -> Self {
        let weight2 = 1.0 - weight1;
        let mut child = parent1.clone();
        Zip::from(&mut child.weights)
            .and(&parent2.weights)
            .for_each(|w, &other| *w = *w * weight1 + other * weight2);
        Zip::from(&mut child.biases)
            .and(&parent2.biases)
            .for_each(|b, &other| *b = *b * weight1 + other * weight2);
        child
    }

    /// Sum of squared parameter differences to another layer of the same shape.
    pub fn squared_distance(&self, other: &Mlp) -> f32 {
        let weights: f32 = self
            .weights
            .iter()
            .zip(other.weights.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum();
        let biases: f32 = self
            .biases
            .iter()
            .zip(other.biases.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum();
        weights + biases
    }
}
