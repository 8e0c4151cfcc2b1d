/* Equipment catalog */
use serde::Deserialize;
use std::fmt;

/// One piece of equipment and the images to download for it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl CatalogItem {
    #[must_use]
    pub fn new(id: &str, name: &str, images: &[&str]) -> Self {
        CatalogItem {
            id: id.to_string(),
            name: name.to_string(),
            images: images.iter().map(|url| (*url).to_string()).collect(),
        }
    }

    /// Returns the output filename (without extension) of the image
    /// at position `index`. A lone image is named after the item id,
    /// otherwise the index is appended: `id_0`, `id_1`...
    #[must_use]
    pub fn basename(&self, index: usize) -> String {
        if self.images.len() > 1 {
            format!("{}_{index}", self.id)
        } else {
            self.id.clone()
        }
    }
}

impl fmt::Display for CatalogItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Total number of image URLs in `catalog`, that is the number
/// of files a fully successful run produces.
#[must_use]
pub fn total_image_count(catalog: &[CatalogItem]) -> usize {
    catalog.iter().map(|item| item.images.len()).sum()
}

const BUILTIN_CATALOG: &[(&str, &str, &[&str])] = &[
    (
        "eqpm00alexa35xx",
        "ARRI Alexa 35",
        &["https://static.bhphoto.com/images/multiple_images/images500x500/1754407216_IMG_2544984.jpg"],
    ),
    (
        "eqpm00venice2xx",
        "Sony Venice 2 (8K)",
        &[
            "https://www.bhphotovideo.com/cdn-cgi/image/fit=scale-down,width=500,quality=95/https://www.bhphotovideo.com/images/images500x500/sony_mpc_3628_venice_2_digital_motion_1636969601_1672825.jpg",
        ],
    ),
    (
        "eqpm00minilfxxx",
        "ARRI Alexa Mini LF",
        &["https://static.bhphoto.com/images/multiple_images/images500x500/1717001182_IMG_2256540.jpg"],
    ),
    (
        "eqpm00sonyfx3xx",
        "Sony FX3",
        &[
            "https://www.bhphotovideo.com/cdn-cgi/image/fit=scale-down,width=500,quality=95/https://www.bhphotovideo.com/images/images500x500/sony_ilme_fx3a_fx3_full_frame_cinema_camera_1746547141_1894322.jpg",
        ],
    ),
    (
        "eqpm00sonyfx9xx",
        "Sony FX9",
        &[
            "https://www.bhphotovideo.com/cdn-cgi/image/fit=scale-down,width=500,quality=95/https://www.bhphotovideo.com/images/images500x500/sony_pxw_fx9v_pxw_fx9_xdcam_6k_full_frame_1568344897_1506002.jpg",
        ],
    ),
    (
        "eqpm00cookes4ix",
        "Cooke S4/i Prime Set",
        &[
            "https://res.cloudinary.com/offshoot/q_50,w_1920,c_limit,f_auto/REIS/products/5fb741a435394a631fe5a51f/cooke_mini_s4_i_lens_set_alt_2",
        ],
    ),
    (
        "eqpm00zeisscp3x",
        "ZEISS Compact Prime CP.3 Set",
        &["https://vmi.tv/wp-content/uploads/sites/3/2023/04/Zeiss-CP3-Set.jpg"],
    ),
    (
        "eqpm00atlasornx",
        "Atlas Orion Anamorphic Set",
        &[
            "https://res.cloudinary.com/offshoot/q_70,w_3840,c_limit,f_auto/REIS/products/5fba0435a9eb364eeb7b54c1/atlas_orion_2x_anamorphic_a_set_hr_3",
        ],
    ),
    (
        "eqpm00arrihi5xx",
        "ARRI Hi-5 Wireless Handheld",
        &[
            "https://www.bhphotovideo.com/cdn-cgi/image/fit=scale-down,width=500,quality=95/https://www.bhphotovideo.com/images/images500x500/arri_kk_0041793_hi_5_rx_tx_2400_set_1655120170_1710021.jpg",
        ],
    ),
    (
        "eqpm00tiltafizx",
        "Tilta Nucleus-M Wireless FIZ",
        &["https://static.bhphoto.com/images/multiple_images/images500x500/1526318171_IMG_988009.jpg"],
    ),
    (
        "eqpm00ocon2575x",
        "OConnor Ultimate 2575D",
        &[
            "https://www.bhphotovideo.com/cdn-cgi/image/fit=scale-down,width=500,quality=95/https://www.bhphotovideo.com/images/images500x500/oconnor_c1234_0005_ultimate_2575d_fluid_head_1466607922_1232548.jpg",
        ],
    ),
    (
        "eqpm00sacht25xx",
        "Sachtler System 25 EFP 2",
        &["https://static.bhphoto.com/images/multiple_images/images500x500/1668707156_IMG_1876954.jpg"],
    ),
    (
        "eqpm00cine7xxxx",
        "SmallHD Cine 7",
        &["https://static.bhphoto.com/images/images500x500/1554137257_1470481.jpg"],
    ),
    (
        "eqpm00codex2tbx",
        "Codex Compact Drive 2TB",
        &["https://static.bhphoto.com/images/images500x500/1553767658_IMG_1161265.jpg"],
    ),
    (
        "eqpm00cfexpaxxx",
        "Sony CFexpress Type A 160GB",
        &["https://static.bhphoto.com/images/images500x500/1601387600_1596707.jpg"],
    ),
];

/// Returns the catalog compiled into the program
#[must_use]
pub fn builtin_catalog() -> Vec<CatalogItem> {
    BUILTIN_CATALOG.iter().map(|(id, name, images)| CatalogItem::new(id, name, images)).collect()
}

#[test]
fn test_basename_single_image() {
    let item = CatalogItem::new("item1", "Item 1", &["https://example.com/a.jpg"]);
    assert_eq!(item.basename(0), "item1");
}

#[test]
fn test_basename_multiple_images() {
    let item = CatalogItem::new("item2", "Item 2", &["https://example.com/a.jpg", "https://example.com/b.jpg"]);
    let names: Vec<String> = (0..item.images.len()).map(|i| item.basename(i)).collect();
    assert_eq!(names, vec!["item2_0", "item2_1"]);
}

#[test]
fn test_total_image_count() {
    let catalog = vec![
        CatalogItem::new("item1", "Item 1", &["https://example.com/a.jpg"]),
        CatalogItem::new("item2", "Item 2", &["https://example.com/b.jpg", "https://example.com/c.jpg"]),
        CatalogItem::new("item3", "Item 3", &[]),
    ];
    assert_eq!(total_image_count(&catalog), 3);
}

// Every built-in item has a unique id so that no file overwrites another
#[test]
fn test_builtin_catalog() {
    let catalog = builtin_catalog();
    assert_eq!(catalog.len(), 15);
    assert_eq!(total_image_count(&catalog), 15);
    assert_eq!(catalog[0].name, "ARRI Alexa 35");

    let mut ids: Vec<&str> = catalog.iter().map(|item| item.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), catalog.len());
}
