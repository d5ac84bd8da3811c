//! Per-oil blend tips
//!
//! Name patterns and composition thresholds produce short advisory notes.

use rust_decimal::Decimal;

use super::quality::push_unique;
use crate::models::{acids, OilInput};

pub const MAX_TIPS: usize = 6;

/// Lowercase name fragment -> tip
const NAME_TIPS: &[(&str, &str)] = &[
    (
        "coconut",
        "Coconut oil cleanses strongly; keep it around 15-30% of oils or raise the superfat.",
    ),
    (
        "palm kernel",
        "Palm kernel oil behaves like coconut; balance it with conditioning oils.",
    ),
    (
        "castor",
        "Castor oil boosts lather but turns sticky above roughly 10% of oils.",
    ),
    (
        "olive",
        "Olive-heavy bars trace slowly and improve with a long cure (6+ weeks).",
    ),
    (
        "shea",
        "Shea butter adds creaminess and hardness; keep it under about 15% to avoid a waxy feel.",
    ),
    (
        "cocoa",
        "Cocoa butter hardens bars quickly; above 15% the bar may crack or feel brittle.",
    ),
    (
        "tallow",
        "Tallow gives a hard, mild, long-lasting bar with creamy lather.",
    ),
    (
        "lard",
        "Lard gives a hard, mild bar with creamy lather.",
    ),
    (
        "beeswax",
        "Beeswax accelerates trace; soap warm and keep it near 1-2% of oils.",
    ),
    (
        "sunflower",
        "Sunflower oil is high in linoleic acid; limit it to avoid dreaded orange spots.",
    ),
    (
        "grapeseed",
        "Grapeseed oil is very unsaturated; keep it low and add an antioxidant.",
    ),
    (
        "hemp",
        "Hemp seed oil is rich in linolenic acid; keep it under about 10% for shelf life.",
    ),
    (
        "avocado",
        "Avocado oil is conditioning and mild; it works well at 10-20% of oils.",
    ),
];

/// Composition thresholds, in blend percent
const FAST_TRACE_LAURIC_MYRISTIC: i64 = 30;
const HARD_BAR_PALMITIC_STEARIC: i64 = 40;
const SLOW_TRACE_OLEIC: i64 = 60;
const DOS_RISK_POLYUNSATURATED: i64 = 20;
const TACKY_RICINOLEIC: i64 = 60;

fn name_tips(name: &str) -> impl Iterator<Item = &'static str> + '_ {
    let lowered = name.to_lowercase();
    NAME_TIPS
        .iter()
        .filter(move |(pattern, _)| lowered.contains(pattern))
        .map(|(_, tip)| *tip)
}

fn composition_tips(oil: &OilInput) -> Vec<String> {
    let Some(profile) = oil.fatty_acids.as_ref() else {
        return Vec::new();
    };
    let mut tips = Vec::new();

    if profile.lauric_myristic() >= Decimal::from(FAST_TRACE_LAURIC_MYRISTIC) {
        tips.push(format!(
            "{} is high in lauric/myristic acids; expect faster trace and more heat.",
            oil.name
        ));
    }
    if profile.palmitic_stearic() >= Decimal::from(HARD_BAR_PALMITIC_STEARIC) {
        tips.push(format!(
            "{} is rich in palmitic/stearic acids; it builds a hard, long-lasting bar.",
            oil.name
        ));
    }
    if profile.get(acids::OLEIC) >= Decimal::from(SLOW_TRACE_OLEIC) {
        tips.push(format!(
            "{} is high in oleic acid; trace will be slow and the bar needs a longer cure.",
            oil.name
        ));
    }
    if profile.polyunsaturated() >= Decimal::from(DOS_RISK_POLYUNSATURATED) {
        tips.push(format!(
            "{} carries a lot of linoleic/linolenic acid; keep it low to reduce DOS risk.",
            oil.name
        ));
    }
    if profile.get(acids::RICINOLEIC) >= Decimal::from(TACKY_RICINOLEIC) {
        tips.push(format!(
            "{} is mostly ricinoleic acid; large amounts make a tacky bar.",
            oil.name
        ));
    }
    tips
}

/// Collect up to [`MAX_TIPS`] distinct tips in oil order
pub fn collect(oils: &[OilInput]) -> Vec<String> {
    let mut tips = Vec::new();

    for oil in oils.iter().filter(|oil| oil.has_mass()) {
        let candidates = name_tips(&oil.name)
            .map(str::to_string)
            .chain(composition_tips(oil));
        for tip in candidates {
            push_unique(&mut tips, tip);
            if tips.len() >= MAX_TIPS {
                return tips;
            }
        }
    }
    tips
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FattyAcidProfile;

    fn oil(name: &str, grams: i64) -> OilInput {
        OilInput::new(name, Decimal::from(grams), Decimal::from(190))
    }

    #[test]
    fn test_name_patterns_are_case_insensitive() {
        let tips = collect(&[oil("Virgin COCONUT Oil", 100)]);
        assert_eq!(tips.len(), 1);
        assert!(tips[0].starts_with("Coconut oil cleanses"));
    }

    #[test]
    fn test_zero_mass_oils_are_skipped() {
        let tips = collect(&[oil("Castor oil", 0)]);
        assert!(tips.is_empty());
    }

    #[test]
    fn test_composition_thresholds() {
        let castor = oil("Ricinus blend", 50).with_fatty_acids(
            FattyAcidProfile::new()
                .with("ricinoleic", Decimal::from(90))
                .with("oleic", Decimal::from(4)),
        );
        let tallow_like = oil("House fat", 50).with_fatty_acids(
            FattyAcidProfile::new()
                .with("palmitic", Decimal::from(26))
                .with("stearic", Decimal::from(20)),
        );
        let tips = collect(&[castor, tallow_like]);
        assert_eq!(tips.len(), 2);
        assert!(tips[0].contains("tacky"));
        assert!(tips[1].contains("hard, long-lasting"));
    }

    fn profiled(name: &str, acids: &[(&str, Decimal)]) -> OilInput {
        let profile = acids
            .iter()
            .fold(FattyAcidProfile::new(), |profile, (acid, percent)| {
                profile.with(acid, *percent)
            });
        oil(name, 100).with_fatty_acids(profile)
    }

    #[test]
    fn test_fast_trace_tip_at_threshold() {
        let at = profiled(
            "Blend A",
            &[("lauric", Decimal::from(20)), ("myristic", Decimal::from(10))],
        );
        let tips = collect(&[at]);
        assert_eq!(tips.len(), 1);
        assert!(tips[0].contains("faster trace"));

        let below = profiled(
            "Blend A",
            &[("lauric", Decimal::from(20)), ("myristic", Decimal::new(99, 1))],
        );
        assert!(collect(&[below]).is_empty());
    }

    #[test]
    fn test_slow_trace_tip_at_threshold() {
        let tips = collect(&[profiled("Blend B", &[("oleic", Decimal::from(60))])]);
        assert_eq!(tips.len(), 1);
        assert!(tips[0].contains("trace will be slow"));

        assert!(collect(&[profiled("Blend B", &[("oleic", Decimal::from(59))])]).is_empty());
    }

    #[test]
    fn test_dos_risk_tip_at_threshold() {
        let at = profiled(
            "Blend C",
            &[("linoleic", Decimal::from(15)), ("linolenic", Decimal::from(5))],
        );
        let tips = collect(&[at]);
        assert_eq!(tips.len(), 1);
        assert!(tips[0].contains("DOS risk"));

        let below = profiled(
            "Blend C",
            &[("linoleic", Decimal::from(15)), ("linolenic", Decimal::from(4))],
        );
        assert!(collect(&[below]).is_empty());
    }

    #[test]
    fn test_duplicates_are_removed() {
        let tips = collect(&[oil("Olive oil", 100), oil("Pomace olive oil", 100)]);
        assert_eq!(tips.len(), 1);
    }

    #[test]
    fn test_cap_stops_early() {
        let oils = vec![
            oil("Coconut oil", 10),
            oil("Castor oil", 10),
            oil("Olive oil", 10),
            oil("Shea butter", 10),
            oil("Cocoa butter", 10),
            oil("Tallow", 10),
            oil("Lard", 10),
            oil("Beeswax", 10),
        ];
        let tips = collect(&oils);
        assert_eq!(tips.len(), MAX_TIPS);
        assert!(tips[5].starts_with("Tallow"));
    }
}
