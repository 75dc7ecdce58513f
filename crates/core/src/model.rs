// SPDX-License-Identifier: GPL-3.0-or-later

// src/model.rs
//
// Placeholder scalar model for smoke-testing the training pipeline
//
use ndarray::{s, Array1, Array2, Array3, ArrayView5};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::config::{ImageShape, KernelSize};
use crate::error::{MedimgError, Result};

const WEIGHT_SEED: u64 = 0;

/// Interface the training framework drives a scalar model through.
pub trait ScalarModel: std::fmt::Debug + Send + Sync {
    /// Image size (z, y, x) the model was built for.
    fn expected_image_size_zyx(&self) -> ImageShape;

    /// Run a batch of shape `[batch, 1, z, y, x]`, returning `[batch, 1]`.
    fn forward(&self, input: ArrayView5<'_, f32>) -> Result<Array2<f32>>;

    /// Number of trainable scalars.
    fn num_parameters(&self) -> usize;
}

/// Single-channel 3D convolution (valid padding, stride 1), flatten, one
/// linear layer to a single output. Weights are deterministic.
#[derive(Debug, Clone)]
pub struct DummyScalarModel {
    image_size: ImageShape,
    conv_weight: Array3<f32>,
    conv_bias: f32,
    fc_weight: Array1<f32>,
    fc_bias: f32,
}

impl DummyScalarModel {
    pub fn new(image_size: ImageShape, kernel_size: KernelSize) -> Result<Self> {
        if kernel_size.iter().any(|&k| k == 0)
            || kernel_size.iter().zip(image_size.iter()).any(|(k, i)| k > i)
        {
            return Err(MedimgError::invalid(format!(
                "kernel_size {:?} does not fit image size {:?}",
                kernel_size, image_size
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(WEIGHT_SEED);
        let [kz, ky, kx] = kernel_size;
        let conv_bound = 1.0 / ((kz * ky * kx) as f32).sqrt();
        let conv_weight = Array3::from_shape_fn((kz, ky, kx), |_| {
            rng.random_range(-conv_bound..conv_bound)
        });
        let conv_bias = rng.random_range(-conv_bound..conv_bound);

        let features = conv_output_len(image_size, kernel_size);
        let fc_bound = 1.0 / (features as f32).sqrt();
        let fc_weight = Array1::from_shape_fn(features, |_| rng.random_range(-fc_bound..fc_bound));
        let fc_bias = rng.random_range(-fc_bound..fc_bound);

        debug!(
            "DummyScalarModel: image {:?}, kernel {:?}, {} features",
            image_size, kernel_size, features
        );
        Ok(Self {
            image_size,
            conv_weight,
            conv_bias,
            fc_weight,
            fc_bias,
        })
    }

    fn conv3d(&self, volume: ndarray::ArrayView3<'_, f32>) -> Array3<f32> {
        let (kz, ky, kx) = self.conv_weight.dim();
        let (z, y, x) = volume.dim();
        let (oz, oy, ox) = (z - kz + 1, y - ky + 1, x - kx + 1);
        Array3::from_shape_fn((oz, oy, ox), |(i, j, k)| {
            let window = volume.slice(s![i..i + kz, j..j + ky, k..k + kx]);
            (&window * &self.conv_weight).sum() + self.conv_bias
        })
    }
}

impl ScalarModel for DummyScalarModel {
    fn expected_image_size_zyx(&self) -> ImageShape {
        self.image_size
    }

    fn num_parameters(&self) -> usize {
        self.conv_weight.len() + 1 + self.fc_weight.len() + 1
    }

    fn forward(&self, input: ArrayView5<'_, f32>) -> Result<Array2<f32>> {
        let shape = input.shape();
        let [z, y, x] = self.image_size;
        if shape[1] != 1 || shape[2..] != [z, y, x] {
            return Err(MedimgError::ShapeMismatch {
                expected: vec![shape[0], 1, z, y, x],
                got: shape.to_vec(),
            });
        }

        let batch = shape[0];
        let mut out = Array2::zeros((batch, 1));
        for b in 0..batch {
            let volume = input.slice(s![b, 0, .., .., ..]);
            let features = self.conv3d(volume);
            // identity activation
            let linear: f32 = features.iter().zip(self.fc_weight.iter()).map(|(f, w)| f * w).sum();
            out[[b, 0]] = linear + self.fc_bias;
        }
        Ok(out)
    }
}

fn conv_output_len(image_size: ImageShape, kernel_size: KernelSize) -> usize {
    image_size
        .iter()
        .zip(kernel_size.iter())
        .map(|(i, k)| i - k + 1)
        .product()
}
