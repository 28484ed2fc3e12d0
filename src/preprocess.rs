use image::imageops::{self, FilterType};
use ndarray::prelude::*;
use nshare::AsNdarray3;

use crate::axis::Axis;
use crate::errors::{ClassifierError, Result};
use crate::image_processor::CanonicalImage;
use crate::traits::{Resolution, TensorAdapter};

/// Input size used when a disaster model does not declare a fixed one.
pub const DEFAULT_DISASTER_RESOLUTION: Resolution = Resolution::square(64);
/// The damage model always consumes 64×64 inputs.
pub const DAMAGE_RESOLUTION: Resolution = Resolution::square(64);

/// `[1, H, W, 3]` tensor in `[0, 1]`, bicubic resize. Feeds the disaster model.
#[derive(Debug, Clone)]
pub struct ChannelsLastAdapter {
    axis: Axis,
    resolution: Resolution,
}

impl ChannelsLastAdapter {
    pub const fn new(axis: Axis, resolution: Resolution) -> Self {
        Self { axis, resolution }
    }
}

impl TensorAdapter for ChannelsLastAdapter {
    fn axis(&self) -> Axis {
        self.axis
    }

    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn adapt(&self, image: &CanonicalImage) -> Result<Array4<f32>> {
        let resized = resize(self.axis, image, self.resolution, FilterType::CatmullRom)?;
        let Resolution { height, width } = self.resolution;

        let hwc = Array3::from_shape_vec((height as usize, width as usize, 3), resized.into_raw())
            .map_err(|e| ClassifierError::Preprocess {
                axis: self.axis,
                reason: format!("pixel buffer does not match {height}x{width}x3: {e}"),
            })?;

        Ok(hwc
            .slice_move(s![NewAxis, .., .., ..])
            .mapv(|v| f32::from(v) / 255.0))
    }
}

/// `[1, 3, H, W]` tensor in `[0, 1]`, bilinear resize. Feeds the damage model.
#[derive(Debug, Clone)]
pub struct ChannelsFirstAdapter {
    axis: Axis,
    resolution: Resolution,
}

impl ChannelsFirstAdapter {
    pub const fn new(axis: Axis, resolution: Resolution) -> Self {
        Self { axis, resolution }
    }
}

impl TensorAdapter for ChannelsFirstAdapter {
    fn axis(&self) -> Axis {
        self.axis
    }

    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn adapt(&self, image: &CanonicalImage) -> Result<Array4<f32>> {
        let resized = resize(self.axis, image, self.resolution, FilterType::Triangle)?;

        // (channel, row, column)
        let chw = resized.as_ndarray3();
        Ok(chw
            .slice_move(s![NewAxis, .., .., ..])
            .mapv(|v| f32::from(v) / 255.0))
    }
}

/// Builds the adapter for `axis` at the resolution computed when its scorer was installed.
pub fn adapter_for(axis: Axis, resolution: Resolution) -> Box<dyn TensorAdapter> {
    match axis {
        Axis::Disaster => Box::new(ChannelsLastAdapter::new(axis, resolution)),
        Axis::Damage => Box::new(ChannelsFirstAdapter::new(axis, resolution)),
    }
}

/// Unconditional resize; the aspect ratio is not preserved.
fn resize(
    axis: Axis,
    image: &CanonicalImage,
    target: Resolution,
    filter: FilterType,
) -> Result<CanonicalImage> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ClassifierError::Preprocess {
            axis,
            reason: format!("image has no pixels ({width}x{height})"),
        });
    }
    if target.width == 0 || target.height == 0 {
        return Err(ClassifierError::Preprocess {
            axis,
            reason: format!("invalid target size {}x{}", target.height, target.width),
        });
    }

    Ok(imageops::resize(image, target.width, target.height, filter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn all_in_unit_range(tensor: &Array4<f32>) -> bool {
        tensor.iter().all(|v| (0.0..=1.0).contains(v))
    }

    #[test]
    fn test_channels_last_shape_and_range() -> Result<()> {
        let adapter = ChannelsLastAdapter::new(Axis::Disaster, DEFAULT_DISASTER_RESOLUTION);
        let image = RgbImage::from_pixel(10, 10, Rgb([255, 128, 0]));

        let tensor = adapter.adapt(&image)?;
        assert_eq!(tensor.shape(), &[1, 64, 64, 3]);
        assert!(all_in_unit_range(&tensor));
        assert!((tensor[[0, 5, 5, 0]] - 1.0).abs() < 1e-6);
        assert!(tensor[[0, 5, 5, 2]].abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_channels_last_non_square_target() -> Result<()> {
        let resolution = Resolution {
            height: 32,
            width: 48,
        };
        let adapter = ChannelsLastAdapter::new(Axis::Disaster, resolution);
        let tensor = adapter.adapt(&RgbImage::new(5, 9))?;
        assert_eq!(tensor.shape(), &[1, 32, 48, 3]);
        Ok(())
    }

    #[test]
    fn test_channels_first_shape_and_order() -> Result<()> {
        let adapter = ChannelsFirstAdapter::new(Axis::Damage, DAMAGE_RESOLUTION);
        let image = RgbImage::from_pixel(100, 20, Rgb([0, 51, 255]));

        let tensor = adapter.adapt(&image)?;
        assert_eq!(tensor.shape(), &[1, 3, 64, 64]);
        assert!(all_in_unit_range(&tensor));
        assert!(tensor[[0, 0, 10, 10]].abs() < 1e-6);
        assert!((tensor[[0, 1, 10, 10]] - 0.2).abs() < 1e-6);
        assert!((tensor[[0, 2, 10, 10]] - 1.0).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_single_pixel_image_is_resized() -> Result<()> {
        let image = RgbImage::from_pixel(1, 1, Rgb([10, 10, 10]));
        for axis in Axis::ALL {
            let adapter = adapter_for(axis, Resolution::square(64));
            let tensor = adapter.adapt(&image)?;
            assert_eq!(tensor.len(), 64 * 64 * 3);
        }
        Ok(())
    }

    #[test]
    fn test_empty_image_is_a_preprocess_error() {
        let adapter = adapter_for(Axis::Damage, DAMAGE_RESOLUTION);
        let result = adapter.adapt(&RgbImage::new(0, 0));
        assert!(matches!(
            result,
            Err(ClassifierError::Preprocess {
                axis: Axis::Damage,
                ..
            })
        ));
    }
}
