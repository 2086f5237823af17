use woodchat_common::FaqEntry;

/// Built-in FAQ entries used when no data file could be loaded.
pub fn default_faqs() -> Vec<FaqEntry> {
    vec![
        FaqEntry::new(
            "What is MDF?",
            "Medium Density Fiberboard (MDF) is an engineered wood product made by breaking down hardwood or softwood residuals into wood fibers, combining it with wax and a resin binder, and forming it into panels by applying high temperature and pressure.",
        )
        .with_material("MDF"),
        FaqEntry::new(
            "What are the advantages of particle board?",
            "Particle board is cost-effective, has consistent density throughout, is environmentally friendly as it uses recycled wood materials, has good screw-holding ability, and is resistant to warping and expansion.",
        )
        .with_material("Particle Board"),
        FaqEntry::new(
            "What is Action TESA HDHMR?",
            "Action TESA HDHMR is a registered trademark of Balaji Action Buildwell Pvt. Ltd. It has many characteristics which make it apparently the first choice of consumers and influencers. HDHMR characteristics include High Density, High Moisture Resistance, Borer Resistance, Termite Resistance, and a ready-to-use smooth surface.",
        )
        .with_material("HDHMR"),
    ]
}
