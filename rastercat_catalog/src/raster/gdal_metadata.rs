//! Parser for the `GDAL_METADATA` TIFF tag (42112).
//!
//! GDAL stores default-domain metadata as a small XML document:
//!
//! ```xml
//! <GDALMetadata>
//!   <Item name="BAND_ORDER">RED,GRE,BLU</Item>
//!   <Item name="STATISTICS_MINIMUM" sample="0">12</Item>
//!   <Item name="DESCRIPTION" sample="0" role="description">red</Item>
//! </GDALMetadata>
//! ```
//!
//! Items without `sample` belong to the dataset, `sample="N"` to band `N + 1`.
//! Items with a `domain` or `role` are not plain tags and are skipped.

use super::Tags;
use regex::Regex;
use std::{collections::BTreeMap, sync::LazyLock};

static ITEM: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r#"(?s)<Item\b([^>]*?)(?:/>|>(.*?)</Item>)"#).expect("valid item regex"));
static ATTRIBUTE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r#"([A-Za-z_][\w.-]*)\s*=\s*"([^"]*)""#).expect("valid attribute regex"));
static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"&(#x[0-9A-Fa-f]+|#[0-9]+|lt|gt|quot|apos|amp);").expect("valid entity regex")
});

#[derive(Debug, Default, PartialEq)]
pub struct GdalMetadata {
	pub dataset: Tags,
	/// Band tags keyed by 1-based band index.
	pub bands: BTreeMap<usize, Tags>,
}

impl GdalMetadata {
	pub fn parse(xml: &str) -> GdalMetadata {
		let mut metadata = GdalMetadata::default();

		for item in ITEM.captures_iter(xml) {
			let mut name = None;
			let mut sample = None;
			let mut skip = false;
			for attribute in ATTRIBUTE.captures_iter(&item[1]) {
				match &attribute[1] {
					"name" => name = Some(unescape(&attribute[2])),
					"sample" => sample = attribute[2].trim().parse::<usize>().ok(),
					"domain" | "role" => skip = true,
					_ => {}
				}
			}

			let Some(name) = name else {
				log::trace!("GDAL metadata item without name: {:?}", &item[0]);
				continue;
			};
			if skip {
				continue;
			}

			let value = unescape(item.get(2).map_or("", |m| m.as_str()));
			match sample {
				Some(sample) => {
					metadata.bands.entry(sample + 1).or_default().insert(name, value);
				}
				None => {
					metadata.dataset.insert(name, value);
				}
			}
		}

		metadata
	}
}

fn unescape(text: &str) -> String {
	ENTITY
		.replace_all(text, |caps: &regex::Captures| {
			let decoded = match &caps[1] {
				"lt" => Some('<'),
				"gt" => Some('>'),
				"quot" => Some('"'),
				"apos" => Some('\''),
				"amp" => Some('&'),
				code => match code.strip_prefix("#x") {
					Some(hex) => u32::from_str_radix(hex, 16).ok(),
					None => code[1..].parse::<u32>().ok(),
				}
				.and_then(char::from_u32),
			};
			decoded.map_or_else(|| caps[0].to_string(), |c| c.to_string())
		})
		.into_owned()
}
