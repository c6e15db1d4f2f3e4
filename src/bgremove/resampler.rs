use image::{imageops, imageops::FilterType, GenericImageView, ImageBuffer, Pixel};
use imageproc::filter::separable_filter;

use crate::error::{Error, Result};
use crate::utils::{clamp_f32_to_primitive, validate_non_empty_image};
use crate::Image;

/// Element of the weight table for area interpolation.
#[derive(Debug, Clone, Copy)]
struct InterpolationWeight {
    destination_index: u32,
    source_index: u32,
    weight: f32,
}

/// Resize and blur operations on 8-bit images and masks.
///
/// Shrinking uses area averaging (OpenCV `INTER_AREA`); enlarging in either
/// direction falls back to bilinear interpolation, as `INTER_AREA` does.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageResampler;

impl ImageResampler {
    /// Resize `src` to exactly `new_width` x `new_height`.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidParameter` - When a target dimension is zero
    /// * `Error::EmptyImage` - When the source has a zero dimension
    pub fn resize<P>(src: &Image<P>, new_width: u32, new_height: u32) -> Result<Image<P>>
    where
        P: Pixel<Subpixel = u8> + 'static,
    {
        if new_width == 0 || new_height == 0 {
            return Err(Error::InvalidParameter(format!(
                "resize target must be positive, got {new_width}x{new_height}"
            )));
        }
        let (src_width, src_height) = src.dimensions();
        validate_non_empty_image(src_width, src_height)?;

        if (src_width, src_height) == (new_width, new_height) {
            return Ok(src.clone());
        }

        if new_width > src_width || new_height > src_height {
            return Ok(imageops::resize(
                src,
                new_width,
                new_height,
                FilterType::Triangle,
            ));
        }

        if can_use_integer_scale(src_width, new_width)
            && can_use_integer_scale(src_height, new_height)
        {
            Ok(resize_area_integer_scale(src, new_width, new_height))
        } else {
            Ok(resize_area_fractional_scale(src, new_width, new_height))
        }
    }

    /// Separable Gaussian blur with an explicit kernel size.
    ///
    /// A `sigma` of zero or less derives the kernel from its size. Border
    /// pixels are replicated.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidParameter` - When a kernel size is zero or even, or sigma is not finite
    /// * `Error::EmptyImage` - When the source has a zero dimension
    pub fn blur<P>(src: &Image<P>, kernel_size: (u32, u32), sigma: f32) -> Result<Image<P>>
    where
        P: Pixel<Subpixel = u8> + Send + Sync + 'static,
    {
        let (width, height) = src.dimensions();
        validate_non_empty_image(width, height)?;

        let horizontal = gaussian_kernel(kernel_size.0, sigma)?;
        let vertical = gaussian_kernel(kernel_size.1, sigma)?;

        Ok(separable_filter(src, &horizontal, &vertical))
    }
}

/// Build a normalized 1-D Gaussian kernel.
///
/// For `sigma <= 0` and sizes up to 7 the fixed binomial tables are used;
/// larger sizes derive `sigma = 0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
pub fn gaussian_kernel(size: u32, sigma: f32) -> Result<Vec<f32>> {
    if size == 0 || size % 2 == 0 {
        return Err(Error::InvalidParameter(format!(
            "kernel size must be odd and positive, got {size}"
        )));
    }
    if !sigma.is_finite() {
        return Err(Error::InvalidParameter(format!(
            "sigma must be finite, got {sigma}"
        )));
    }

    if sigma <= 0.0 {
        match size {
            1 => return Ok(vec![1.0]),
            3 => return Ok(vec![0.25, 0.5, 0.25]),
            5 => return Ok(vec![0.0625, 0.25, 0.375, 0.25, 0.0625]),
            7 => {
                return Ok(vec![
                    0.03125, 0.109_375, 0.218_75, 0.281_25, 0.218_75, 0.109_375, 0.03125,
                ])
            }
            _ => {}
        }
    }

    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((size - 1) as f32 * 0.5 - 1.0) + 0.8
    };
    let center = (size / 2) as f32;
    let scale = -0.5 / (sigma * sigma);

    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let x = i as f32 - center;
            (scale * x * x).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|weight| *weight /= sum);

    Ok(kernel)
}

/// Compute resize area decimation table.
fn compute_interpolation_weights(
    src_size: u32,
    dst_size: u32,
    scale: f32,
) -> Vec<InterpolationWeight> {
    let mut tab = Vec::new();

    for dx in 0..dst_size {
        let src_x_start = dx as f32 * scale;
        let src_x_end = src_x_start + scale;

        let src_x_start_int = (src_x_start.ceil() as u32).min(src_size);
        let src_x_end_int = (src_x_end.floor() as u32).min(src_size);

        // Footprints clipped by the image edge are renormalized over the covered span
        let cell_width = if src_x_end > src_size as f32 {
            src_size as f32 - src_x_start
        } else {
            scale
        };

        // Left partial overlap
        if src_x_start_int > 0 && (src_x_start_int as f32 - src_x_start) > 1e-3 {
            tab.push(InterpolationWeight {
                destination_index: dx,
                source_index: src_x_start_int - 1,
                weight: (src_x_start_int as f32 - src_x_start) / cell_width,
            });
        }

        for sx in src_x_start_int..src_x_end_int {
            tab.push(InterpolationWeight {
                destination_index: dx,
                source_index: sx,
                weight: 1.0 / cell_width,
            });
        }

        // Right partial overlap
        if src_x_end_int < src_size && (src_x_end - src_x_end_int as f32) > 1e-3 {
            tab.push(InterpolationWeight {
                destination_index: dx,
                source_index: src_x_end_int,
                weight: (src_x_end - src_x_end_int as f32) / cell_width,
            });
        }
    }

    tab
}

/// Check if we can use the integer scale optimization.
fn can_use_integer_scale(src_size: u32, dst_size: u32) -> bool {
    src_size >= dst_size && src_size % dst_size == 0
}

/// Box average over exact `scale_x` x `scale_y` blocks.
fn resize_area_integer_scale<P>(src: &Image<P>, dst_width: u32, dst_height: u32) -> Image<P>
where
    P: Pixel<Subpixel = u8>,
{
    let (src_width, src_height) = src.dimensions();
    let scale_x = src_width / dst_width;
    let scale_y = src_height / dst_height;
    let inv_area = 1.0 / (scale_x * scale_y) as f32;
    let channels = P::CHANNEL_COUNT as usize;

    ImageBuffer::from_fn(dst_width, dst_height, |dx, dy| {
        let mut pixel_sum = vec![0.0f32; channels];

        let start_x = dx * scale_x;
        let start_y = dy * scale_y;
        for sy in start_y..start_y + scale_y {
            for sx in start_x..start_x + scale_x {
                for (sum, &sample) in pixel_sum.iter_mut().zip(src.get_pixel(sx, sy).channels()) {
                    *sum += f32::from(sample);
                }
            }
        }

        let output_channels: Vec<u8> = pixel_sum
            .iter()
            .map(|&sum| clamp_f32_to_primitive(sum * inv_area + 0.5))
            .collect();
        *P::from_slice(&output_channels)
    })
}

/// Fractional scale implementation for arbitrary shrink factors.
fn resize_area_fractional_scale<P>(src: &Image<P>, dst_width: u32, dst_height: u32) -> Image<P>
where
    P: Pixel<Subpixel = u8>,
{
    let (src_width, src_height) = src.dimensions();
    let scale_x = src_width as f32 / dst_width as f32;
    let scale_y = src_height as f32 / dst_height as f32;

    let x_weights = compute_interpolation_weights(src_width, dst_width, scale_x);
    let y_weights = compute_interpolation_weights(src_height, dst_height, scale_y);

    let channels = P::CHANNEL_COUNT as usize;
    let row_len = dst_width as usize * channels;
    let mut output = ImageBuffer::new(dst_width, dst_height);

    let mut buf = vec![0.0f32; row_len];
    let mut sum = vec![0.0f32; row_len];
    let mut current_dy = None;

    let flush_row = |output: &mut Image<P>, sum: &[f32], dy: u32| {
        for (dx, pixel_sum) in (0..dst_width).zip(sum.chunks_exact(channels)) {
            let pixel_channels: Vec<u8> = pixel_sum
                .iter()
                .map(|&value| clamp_f32_to_primitive(value + 0.5))
                .collect();
            output.put_pixel(dx, dy, *P::from_slice(&pixel_channels));
        }
    };

    for y_entry in &y_weights {
        if let Some(dy) = current_dy {
            if dy != y_entry.destination_index {
                flush_row(&mut output, &sum, dy);
                sum.fill(0.0);
            }
        }
        current_dy = Some(y_entry.destination_index);

        // Horizontal pass over source row
        buf.fill(0.0);
        for x_entry in &x_weights {
            let src_pixel = src.get_pixel(x_entry.source_index, y_entry.source_index);
            let offset = x_entry.destination_index as usize * channels;
            for (acc, &sample) in buf[offset..offset + channels]
                .iter_mut()
                .zip(src_pixel.channels())
            {
                *acc += f32::from(sample) * x_entry.weight;
            }
        }

        for (acc, &value) in sum.iter_mut().zip(&buf) {
            *acc += value * y_entry.weight;
        }
    }

    if let Some(dy) = current_dy {
        flush_row(&mut output, &sum, dy);
    }

    output
}
