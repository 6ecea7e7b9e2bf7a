use ratatui::style::Color;

pub fn color_for_condition(condition: &str) -> Color {
    match normalize(condition).as_str() {
        "new" | "brand-new" => Color::Green,
        "like-new" | "excellent" => Color::LightGreen,
        "good" | "very-good" => Color::Yellow,
        "fair" | "used" => Color::LightYellow,
        "poor" | "for-parts" => Color::LightRed,
        _ => Color::Gray,
    }
}

pub fn icon_for_category(category: &str) -> &'static str {
    match normalize(category).as_str() {
        "books" => "\u{1F4DA}",                             // books
        "electronics" => "\u{1F4BB}",                       // laptop
        "furniture" => "\u{1FA91}",                         // chair
        "clothing" | "clothes" | "fashion" => "\u{1F455}", // shirt
        "sports" => "\u{26BD}",                             // ball
        "toys" | "games" => "\u{1F9F8}",                    // teddy bear
        "kitchen" | "home" => "\u{1F373}",                  // pan
        "garden" | "plants" => "\u{1F331}",                 // seedling
        "music" | "instruments" => "\u{1F3B8}",             // guitar
        "tools" => "\u{1F527}",                             // wrench
        "baby" | "kids" => "\u{1F37C}",                     // bottle
        _ => "\u{1F4E6}",                                   // package
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase().replace([' ', '_'], "-")
}
