//! Static wood-material catalog and the HTML fragments built from it.
//!
//! Fragments are complete, self-contained markup. The chat surface inserts
//! them as a block instead of typing them out.

/// Reference data for one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WoodMaterial {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub features: [&'static str; 4],
    pub price_range: &'static str,
    /// 1..=5
    pub durability_rating: u8,
    pub moisture_resistance: &'static str,
    pub recommended_uses: [&'static str; 4],
    pub note: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Material {
    Mdf,
    ParticleBoard,
    Hdhmr,
    Boilo,
}

impl Material {
    pub const ALL: [Material; 4] = [
        Material::Mdf,
        Material::ParticleBoard,
        Material::Hdhmr,
        Material::Boilo,
    ];

    pub fn info(self) -> &'static WoodMaterial {
        match self {
            Material::Mdf => &MDF,
            Material::ParticleBoard => &PARTICLE_BOARD,
            Material::Hdhmr => &HDHMR,
            Material::Boilo => &BOILO,
        }
    }

    pub fn key(self) -> &'static str {
        self.info().key
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Material::Mdf => &["mdf", "medium density", "medium density fiberboard", "medium-density"],
            Material::ParticleBoard => &["particleboard", "particle board", "particle wood", "chipboard"],
            Material::Hdhmr => &["hdhmr", "high density", "moisture resistant", "action tesa", "tesa"],
            Material::Boilo => &["boilo", "boiling water resistant", "water resistant", "waterproof board"],
        }
    }
}

static MDF: WoodMaterial = WoodMaterial {
    key: "mdf",
    title: "MDF (Medium Density Fiberboard)",
    description: "A high-grade, composite wood product made from wood fibers, glued under high temperature and pressure.",
    features: [
        "Smooth, flat surface ideal for painting and laminating",
        "Consistent density throughout the board",
        "Excellent machinability for detailed work",
        "No grain pattern, reducing waste in cutting",
    ],
    price_range: "Moderate (₹30-40 per sq ft)",
    durability_rating: 4,
    moisture_resistance: "Low to Moderate",
    recommended_uses: ["Interior furniture", "Cabinets", "Decorative panels", "Wall units"],
    note: "Perfect for furniture, cabinetry, and interior design applications",
};

static PARTICLE_BOARD: WoodMaterial = WoodMaterial {
    key: "particleBoard",
    title: "Particle Board",
    description: "An engineered wood product manufactured from wood particles, chips, and sawmill shavings, bonded with synthetic resin.",
    features: [
        "Cost-effective solution for furniture",
        "Uniform density and stability",
        "Good screw-holding capacity",
        "Environmentally friendly - uses recycled wood materials",
    ],
    price_range: "Economic (₹25-35 per sq ft)",
    durability_rating: 3,
    moisture_resistance: "Low",
    recommended_uses: ["Budget furniture", "Shelving", "Office furniture", "Temporary installations"],
    note: "Ideal for interior furniture and non-structural applications",
};

static HDHMR: WoodMaterial = WoodMaterial {
    key: "hdhmr",
    title: "HDHMR (High Density High Moisture Resistant)",
    description: "Advanced engineered wood with enhanced density and moisture resistance properties.",
    features: [
        "Superior moisture resistance",
        "High density for better strength",
        "Excellent screw holding capacity",
        "Suitable for high humidity areas",
    ],
    price_range: "Premium (₹45-60 per sq ft)",
    durability_rating: 5,
    moisture_resistance: "High",
    recommended_uses: [
        "Kitchen cabinets",
        "Bathroom furniture",
        "Laboratory furniture",
        "Commercial installations",
    ],
    note: "Recommended for kitchen cabinets and bathroom furniture",
};

static BOILO: WoodMaterial = WoodMaterial {
    key: "boilo",
    title: "BOILO",
    description: "A specialized wood product designed for exterior and high-moisture applications.",
    features: [
        "100% boiling water resistant",
        "Weather-proof properties",
        "High structural stability",
        "Long-lasting durability",
    ],
    price_range: "Premium Plus (₹55-70 per sq ft)",
    durability_rating: 5,
    moisture_resistance: "Very High",
    recommended_uses: [
        "Exterior furniture",
        "Marine applications",
        "Outdoor installations",
        "Industrial use",
    ],
    note: "Perfect for exterior applications and wet areas",
};

/// Terms that route a message to the local catalog before the backend.
const WOOD_QUERY_TERMS: &[&str] = &[
    "mdf",
    "particle board",
    "particleboard",
    "hdhmr",
    "boilo",
    "compare",
    "vs",
    "versus",
    "difference between",
    "better",
    "best",
    "stronger",
    "which is",
    "recommend",
    "prefer",
    "advantages",
    "disadvantages",
    "pros and cons",
];

/// Case-insensitive substring test against the material and comparison terms.
///
/// ```
/// use woodchat_faq::catalog::is_wood_query;
///
/// assert!(is_wood_query("Compare MDF and HDHMR"));
/// assert!(is_wood_query("which is better for kitchens?"));
/// assert!(!is_wood_query("What are your opening hours?"));
/// ```
pub fn is_wood_query(text: &str) -> bool {
    let lower = text.to_lowercase();
    WOOD_QUERY_TERMS.iter().any(|term| lower.contains(term))
}

/// Materials named in `text`, in catalog order.
pub fn extract_material_names(text: &str) -> Vec<Material> {
    let lower = text.to_lowercase();
    Material::ALL
        .into_iter()
        .filter(|m| m.aliases().iter().any(|alias| lower.contains(alias)))
        .collect()
}

/// Comparison cards for every material named in `text`.
///
/// `None` unless at least one material is named and the text asks to compare.
///
/// ```
/// use woodchat_faq::catalog::comparison_response;
///
/// let html = comparison_response("compare mdf with boilo").unwrap();
/// assert!(html.starts_with("<div class=\"wood-comparison\">"));
/// assert!(html.contains("MDF (Medium Density Fiberboard)"));
/// assert!(html.contains("BOILO"));
/// assert!(comparison_response("is mdf good?").is_none());
/// assert!(comparison_response("compare prices").is_none());
/// ```
pub fn comparison_response(text: &str) -> Option<String> {
    let materials = extract_material_names(text);
    if materials.is_empty() || !text.to_lowercase().contains("compare") {
        return None;
    }
    let cards: String = materials.into_iter().map(|m| material_card(m.info())).collect();
    Some(format!(
        "<div class=\"wood-comparison\"><div class=\"comparison-grid\">{cards}</div></div>"
    ))
}

fn list_items(items: &[&str]) -> String {
    items.iter().map(|i| format!("<li>{i}</li>")).collect()
}

fn durability_stars(rating: u8) -> String {
    let filled = rating.min(5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// One material card.
pub fn material_card(m: &WoodMaterial) -> String {
    format!(
        concat!(
            "<div class=\"wood-material\">",
            "<div class=\"wood-material-title\">{title}</div>",
            "<div class=\"wood-material-description\">{description}</div>",
            "<ul class=\"wood-material-features\">{features}</ul>",
            "<div class=\"wood-material-specs\">",
            "<div class=\"spec-item\"><strong>Price Range:</strong> {price}</div>",
            "<div class=\"spec-item\"><strong>Durability:</strong> {stars}</div>",
            "<div class=\"spec-item\"><strong>Moisture Resistance:</strong> {moisture}</div>",
            "<div class=\"spec-item\"><strong>Recommended Uses:</strong></div>",
            "<ul class=\"recommended-uses\">{uses}</ul>",
            "</div>",
            "<div class=\"wood-material-note\">{note}</div>",
            "</div>"
        ),
        title = m.title,
        description = m.description,
        features = list_items(&m.features),
        price = m.price_range,
        stars = durability_stars(m.durability_rating),
        moisture = m.moisture_resistance,
        uses = list_items(&m.recommended_uses),
        note = m.note,
    )
}

/// Spoken version of [`contact_fragment`].
pub const CONTACT_NARRATION: &str = "I'm sorry, I don't have enough information to answer that question. Please contact our Tesa expert team. Email: support@tesa.com. Phone: +91-1234567890. Hours: Monday to Saturday, 9 AM to 6 PM.";

/// Contact details shown in place of a low-confidence answer.
pub fn contact_fragment() -> String {
    concat!(
        "<p>I'm sorry, I don't have enough information to answer that question.</p>",
        "<p>Please contact our Tesa expert team:</p>",
        "<div class=\"contact-details\">",
        "<div><strong>Email: </strong>customerservices@actiontesa.com</div>",
        "<div><strong>Phone: </strong>1800-3090-707</div>",
        "<div><strong>Hours: </strong>Monday to Saturday,&nbsp;9 AM to 6 PM</div>",
        "</div>"
    )
    .to_string()
}

/// Whether a backend answer reads as a material comparison.
pub fn mentions_comparison(answer: &str) -> bool {
    answer.contains("wood comparison") || answer.to_lowercase().contains("compare")
}

/// Wrap a backend comparison answer in the comparison frame.
///
/// ```
/// use woodchat_faq::catalog::answer_comparison_fragment;
///
/// let html = answer_comparison_fragment("MDF is smoother.\nHDHMR resists moisture.");
/// assert!(html.contains("<h4>Wood Comparison</h4>"));
/// assert!(html.contains("MDF is smoother.<br>HDHMR resists moisture."));
/// ```
pub fn answer_comparison_fragment(answer: &str) -> String {
    format!(
        concat!(
            "<div class=\"wood-comparison\">",
            "<div class=\"comparison-header\"><h4>Wood Comparison</h4></div>",
            "<div class=\"wood-material\"><div class=\"wood-material-description\">{body}</div></div>",
            "<div class=\"comparison-footer\"><p><em>Note: Properties may vary based on specific grade and treatment</em></p></div>",
            "</div>"
        ),
        body = answer.replace('\n', "<br>"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_map_to_catalog_order() {
        assert_eq!(
            extract_material_names("Is BOILO or chipboard or Action Tesa better than MDF?"),
            vec![
                Material::Mdf,
                Material::ParticleBoard,
                Material::Hdhmr,
                Material::Boilo
            ]
        );
        assert_eq!(extract_material_names("waterproof board"), vec![Material::Boilo]);
        assert!(extract_material_names("plywood").is_empty());
    }

    #[test]
    fn keys_match_catalog_names() {
        let keys: Vec<_> = Material::ALL.iter().map(|m| m.key()).collect();
        assert_eq!(keys, ["mdf", "particleBoard", "hdhmr", "boilo"]);
    }

    #[test]
    fn cards_show_star_rating() {
        let card = material_card(Material::ParticleBoard.info());
        assert!(card.contains("★★★☆☆"));
        assert!(card.contains("<li>Shelving</li>"));
        assert!(material_card(Material::Boilo.info()).contains("★★★★★"));
    }

    #[test]
    fn comparison_keeps_one_card_per_material() {
        let html = comparison_response("Compare particle board, particleboard and HDHMR").unwrap();
        assert_eq!(html.matches("class=\"wood-material\"").count(), 2);
    }

    #[test]
    fn vs_alone_is_a_wood_query_without_cards() {
        assert!(is_wood_query("mdf vs hdhmr"));
        assert!(comparison_response("mdf vs hdhmr").is_none());
    }

    #[test]
    fn comparison_detection_on_answers() {
        assert!(mentions_comparison("Here is a wood comparison of both"));
        assert!(mentions_comparison("Compared to MDF, HDHMR is denser"));
        assert!(!mentions_comparison("MDF is an engineered wood product."));
    }

    #[test]
    fn contact_fragment_lists_channels() {
        let html = contact_fragment();
        assert!(html.contains("Email: "));
        assert!(html.contains("1800-3090-707"));
        assert!(CONTACT_NARRATION.starts_with("I'm sorry"));
    }
}
