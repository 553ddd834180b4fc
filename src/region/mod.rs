//! Connected regions derived from a segmentation label map.
//!
//! Grouping is by connectivity, not by label value: the same label appearing
//! in two disconnected blobs produces two regions.

use crate::field::RegionMap;
use crate::image::Frame;
use crate::pixel::Pixel;
use crate::util::{MotionError, MotionResult};

/// Pixel neighbourhood used by the flood fill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Connectivity {
    /// Horizontal and vertical neighbours.
    #[default]
    Four,
    /// Horizontal, vertical and diagonal neighbours.
    Eight,
}

impl Connectivity {
    fn offsets(self) -> &'static [(isize, isize)] {
        const FOUR: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        const EIGHT: [(isize, isize); 8] = [
            (1, 0),
            (-1, 0),
            (0, 1),
            (0, -1),
            (1, 1),
            (1, -1),
            (-1, 1),
            (-1, -1),
        ];
        match self {
            Connectivity::Four => &FOUR,
            Connectivity::Eight => &EIGHT,
        }
    }
}

/// A maximal set of same-labelled, spatially connected pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectedRegion {
    label: i32,
    pixels: Vec<(usize, usize)>,
}

impl ConnectedRegion {
    /// Creates a region from a pixel list, sorted into row-major order.
    pub fn new(label: i32, mut pixels: Vec<(usize, usize)>) -> Self {
        pixels.sort_unstable_by_key(|&(x, y)| (y, x));
        Self { label, pixels }
    }

    /// Label shared by every member pixel.
    pub fn label(&self) -> i32 {
        self.label
    }

    /// Member pixels `(x, y)` in row-major order.
    pub fn pixels(&self) -> &[(usize, usize)] {
        &self.pixels
    }

    /// Number of member pixels.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// True when the region holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Mean pixel position, or `None` for an empty region.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.pixels.is_empty() {
            return None;
        }
        let n = self.pixels.len() as f64;
        let (sx, sy) = self
            .pixels
            .iter()
            .fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x as f64, sy + y as f64));
        Some((sx / n, sy / n))
    }
}

/// Checks that `map` covers a `width x height` frame with non-negative labels.
pub fn validate_region_map(map: &RegionMap, width: usize, height: usize) -> MotionResult<()> {
    if map.dims() != (width, height) {
        return Err(MotionError::DimensionMismatch {
            expected: (width, height),
            got: map.dims(),
            context: "region map",
        });
    }
    for y in 0..map.height() {
        for x in 0..map.width() {
            let label = map[(x, y)];
            if label < 0 {
                return Err(MotionError::NegativeLabel { x, y, label });
            }
        }
    }
    Ok(())
}

/// Extracts every connected component of `map`.
///
/// Regions are ordered by their first pixel in row-major order. Fails on
/// negative labels.
pub fn get_connected_region_list(
    map: &RegionMap,
    connectivity: Connectivity,
) -> MotionResult<Vec<ConnectedRegion>> {
    validate_region_map(map, map.width(), map.height())?;

    let width = map.width();
    let mut visited = vec![false; map.len()];
    let mut regions = Vec::new();
    let mut stack = Vec::new();

    for seed_y in 0..map.height() {
        for seed_x in 0..width {
            if visited[seed_y * width + seed_x] {
                continue;
            }
            let label = map[(seed_x, seed_y)];
            let mut pixels = Vec::new();
            visited[seed_y * width + seed_x] = true;
            stack.push((seed_x, seed_y));

            while let Some((x, y)) = stack.pop() {
                pixels.push((x, y));
                for &(dx, dy) in connectivity.offsets() {
                    let Some((nx, ny)) = map.checked_coords(x as isize + dx, y as isize + dy)
                    else {
                        continue;
                    };
                    let idx = ny * width + nx;
                    if !visited[idx] && map[(nx, ny)] == label {
                        visited[idx] = true;
                        stack.push((nx, ny));
                    }
                }
            }

            regions.push(ConnectedRegion::new(label, pixels));
        }
    }

    Ok(regions)
}

/// Paints every region of `frame` with the region's mean value.
///
/// Pixels not covered by any region keep their original value.
pub fn get_color_quantized_image<T: Pixel>(
    frame: &Frame<T>,
    regions: &[ConnectedRegion],
) -> MotionResult<Frame<T>> {
    let mut quantized = frame.clone();
    for region in regions {
        if region.is_empty() {
            continue;
        }
        let mut acc = T::Accum::default();
        let weight = 1.0 / region.len() as f64;
        for &(x, y) in region.pixels() {
            let value = frame
                .get(x, y)
                .copied()
                .ok_or(MotionError::RegionOutOfBounds { x, y })?;
            acc = T::accumulate(acc, value, weight);
        }
        let mean = T::from_accum(acc);
        for &(x, y) in region.pixels() {
            quantized[(x, y)] = mean;
        }
    }
    Ok(quantized)
}

/// Region lists and quantized frames cached for one bound label-map pair.
#[derive(Clone, Debug)]
pub(crate) struct RegionSupport<T> {
    pub(crate) regions_prev: Vec<ConnectedRegion>,
    pub(crate) regions_next: Vec<ConnectedRegion>,
    pub(crate) quantized_prev: Frame<T>,
    pub(crate) quantized_next: Frame<T>,
}

impl<T: Pixel> RegionSupport<T> {
    pub(crate) fn build(
        prev: &Frame<T>,
        next: &Frame<T>,
        map_prev: &RegionMap,
        map_next: &RegionMap,
        connectivity: Connectivity,
    ) -> MotionResult<Self> {
        validate_region_map(map_prev, prev.width(), prev.height())?;
        validate_region_map(map_next, next.width(), next.height())?;
        let regions_prev = get_connected_region_list(map_prev, connectivity)?;
        let regions_next = get_connected_region_list(map_next, connectivity)?;
        let quantized_prev = get_color_quantized_image(prev, &regions_prev)?;
        let quantized_next = get_color_quantized_image(next, &regions_next)?;
        Ok(Self {
            regions_prev,
            regions_next,
            quantized_prev,
            quantized_next,
        })
    }
}
