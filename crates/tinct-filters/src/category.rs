//! Stock filter menus, one per filter family.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tinct_session::{DisplaySize, FilterDescriptor, SessionOptions};

use crate::error::FilterError;
use crate::kind::FilterKind;
use crate::noise::{DEFAULT_MIXED_PEPPER, DEFAULT_PROBABILITY, DEFAULT_SEED};
use crate::smooth::DEFAULT_KERNEL;

/// Kernel size of the cheap box-blur preview for the high-quality
/// Gaussian.
const HQ_PREVIEW_KERNEL: u32 = 3;

/// A family of filters with its own menu and dialog defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Blurs and rank filters.
    Smooth,
    /// Laplacian, Sobel and Prewitt.
    Sharp,
    /// Salt, pepper, and both.
    Noise,
}

impl Category {
    /// Every category, in menu order.
    pub const ALL: [Self; 3] = [Self::Smooth, Self::Sharp, Self::Noise];

    /// Preview bounding box used by the stock menus.
    pub const DISPLAY_MAX_SIZE: DisplaySize = DisplaySize::new(800, 600);

    /// Dialog title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Smooth => "Smoothing Filters",
            Self::Sharp => "Sharpening Filters",
            Self::Noise => "Noise Filters",
        }
    }

    /// Menu entries as `(name, full, preview)`; `preview` is `None` when
    /// the full filter doubles as its own preview.
    #[must_use]
    pub fn entries(self) -> Vec<(&'static str, FilterKind, Option<FilterKind>)> {
        let k = DEFAULT_KERNEL;
        match self {
            Self::Smooth => vec![
                (
                    "Gaussian Blur (HQ)",
                    FilterKind::Gaussian { ksize: k },
                    Some(FilterKind::Mean {
                        ksize: HQ_PREVIEW_KERNEL,
                    }),
                ),
                ("Mean Filter", FilterKind::Mean { ksize: k }, None),
                ("Median Filter", FilterKind::Median { ksize: k }, None),
                ("Min Filter", FilterKind::Min { ksize: k }, None),
                ("Max Filter", FilterKind::Max { ksize: k }, None),
            ],
            Self::Sharp => vec![
                ("Laplacian", FilterKind::Laplacian, None),
                ("Sobel", FilterKind::Sobel, None),
                ("Prewitt", FilterKind::Prewitt, None),
            ],
            Self::Noise => vec![
                (
                    "Salt Noise",
                    FilterKind::Salt {
                        probability: DEFAULT_PROBABILITY,
                        seed: DEFAULT_SEED,
                    },
                    None,
                ),
                (
                    "Pepper Noise",
                    FilterKind::Pepper {
                        probability: DEFAULT_PROBABILITY,
                        seed: DEFAULT_SEED,
                    },
                    None,
                ),
                (
                    "Salt and Pepper Noise",
                    FilterKind::SaltAndPepper {
                        salt: DEFAULT_PROBABILITY,
                        pepper: DEFAULT_MIXED_PEPPER,
                        seed: DEFAULT_SEED,
                    },
                    None,
                ),
            ],
        }
    }

    /// Menu as session descriptors.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`] if a stock filter has invalid parameters.
    pub fn descriptors(self) -> Result<Vec<FilterDescriptor>, FilterError> {
        self.entries()
            .into_iter()
            .map(|(name, full, preview)| describe(name, full, preview))
            .collect()
    }

    /// Session options for this category's dialog: its title, an 800x600
    /// preview box, cumulative selection.
    #[must_use]
    pub fn options(self) -> SessionOptions {
        SessionOptions {
            display_max_size: Self::DISPLAY_MAX_SIZE,
            cumulative: true,
            title: self.title().to_string(),
            ..SessionOptions::default()
        }
    }
}

/// Build one descriptor from library filters.
///
/// # Errors
///
/// Returns a [`FilterError`] if either filter has invalid parameters.
pub fn describe(
    name: impl Into<String>,
    full: FilterKind,
    preview: Option<FilterKind>,
) -> Result<FilterDescriptor, FilterError> {
    let name = name.into();
    Ok(match preview {
        None => FilterDescriptor::Single {
            name,
            transform: full.into_transform()?,
        },
        Some(preview) => FilterDescriptor::Split {
            name,
            full: full.into_transform()?,
            preview: preview.into_transform()?,
        },
    })
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Smooth => f.write_str("smooth"),
            Self::Sharp => f.write_str("sharp"),
            Self::Noise => f.write_str("noise"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown filter category '{s}' (expected smooth, sharp or noise)"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::Rgb;
    use tinct_session::{CanonicalImage, FilterSession, normalize_descriptors};

    #[test]
    fn menus_match_families() {
        let names = |c: Category| -> Vec<&'static str> { c.entries().into_iter().map(|e| e.0).collect() };
        assert_eq!(
            names(Category::Smooth),
            ["Gaussian Blur (HQ)", "Mean Filter", "Median Filter", "Min Filter", "Max Filter"],
        );
        assert_eq!(names(Category::Sharp), ["Laplacian", "Sobel", "Prewitt"]);
        assert_eq!(
            names(Category::Noise),
            ["Salt Noise", "Pepper Noise", "Salt and Pepper Noise"],
        );
    }

    #[test]
    fn every_stock_filter_is_valid() {
        for category in Category::ALL {
            let specs = normalize_descriptors(category.descriptors().unwrap()).unwrap();
            assert_eq!(specs.len(), category.entries().len());
        }
    }

    #[test]
    fn only_hq_gaussian_has_separate_preview() {
        let specs = normalize_descriptors(Category::Smooth.descriptors().unwrap()).unwrap();
        assert!(!specs[0].shares_preview());
        assert!(specs[1..].iter().all(tinct_session::FilterSpec::shares_preview));
    }

    #[test]
    fn stock_parameters() {
        let noise = Category::Noise.entries();
        assert_eq!(
            noise[2].1,
            FilterKind::SaltAndPepper {
                salt: 0.15,
                pepper: 0.01,
                seed: 0,
            }
        );
        assert_eq!(noise[0].1, FilterKind::Salt { probability: 0.15, seed: 0 });

        let smooth = Category::Smooth.entries();
        assert_eq!(smooth[0].1, FilterKind::Gaussian { ksize: 3 });
        assert_eq!(smooth[2].1, FilterKind::Median { ksize: 3 });
    }

    #[test]
    fn options_follow_category() {
        let options = Category::Sharp.options();
        assert_eq!(options.title, "Sharpening Filters");
        assert_eq!(options.display_max_size, DisplaySize::new(800, 600));
        assert!(options.cumulative);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn parses_names() {
        assert_eq!("smooth".parse::<Category>().unwrap(), Category::Smooth);
        assert_eq!("Noise".parse::<Category>().unwrap(), Category::Noise);
        assert!("blur".parse::<Category>().is_err());
    }

    #[test]
    fn stock_menu_drives_a_session() {
        let source = CanonicalImage::from_fn(40, 30, |x, y| Rgb([(x * 6) as u8, (y * 8) as u8, 120]));
        let mut session =
            FilterSession::new(source, Category::Smooth.descriptors().unwrap(), Category::Smooth.options())
                .unwrap();
        for index in 0..5 {
            session.select(index).unwrap();
        }
        session.apply().unwrap();
        assert_eq!(session.result().unwrap().dimensions(), (40, 30));
    }
}
