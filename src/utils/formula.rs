// src/utils/formula.rs

//! Plain-text scientific notation to LaTeX markup.
//!
//! Three ordered rule layers are folded over the input: physics, then
//! chemistry, then generic math. Each layer only emits markup that the later
//! layers' patterns cannot match again (`_{..}`, `^{..}` and `\command`).

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// A single substitution. `replacement` uses `${n}` capture syntax.
struct Rule {
    pattern: Regex,
    replacement: String,
}

impl Rule {
    fn new(pattern: &str, replacement: &str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("formula rule pattern must compile"),
            replacement: replacement.to_string(),
        }
    }

    fn apply<'a>(&self, text: Cow<'a, str>) -> Cow<'a, str> {
        let replaced = match self.pattern.replace_all(&text, self.replacement.as_str()) {
            Cow::Borrowed(_) => None,
            Cow::Owned(replaced) => Some(replaced),
        };
        match replaced {
            Some(replaced) => Cow::Owned(replaced),
            None => text,
        }
    }
}

static PHYSICS_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        // 3x10^8, 1.6 * 10^-19, 6.02×10^(23)
        Rule::new(
            r"(\d)\s*[x×*]\s*10\^\(?(-?\d+)\)?",
            r"${1} \times 10^{${2}}",
        ),
        Rule::new(r"\bm/s\^?2\b", r"m/s^{2}"),
        Rule::new(r"\bohms?\b", r"\Omega"),
        Rule::new(r"°\s?([CFK])\b", r"^{\circ}${1}"),
        Rule::new(r"(\d)\s*degrees?\b", r"${1}^{\circ}"),
        Rule::new(r"\bvec\(([^()]*)\)", r"\vec{${1}}"),
        // initial / final values of kinematic variables: v0, u1, x2, t0
        Rule::new(r"\b([vuxt])([0-2])\b", r"${1}_{${2}}"),
    ]
});

/// Known formulas and ions with their markup. Applied longest first.
const COMPOUNDS: &[(&str, &str)] = &[
    // ions
    ("SO42-", "SO_{4}^{2-}"),
    ("SO32-", "SO_{3}^{2-}"),
    ("NO3-", "NO_{3}^{-}"),
    ("NO2-", "NO_{2}^{-}"),
    ("PO43-", "PO_{4}^{3-}"),
    ("CO32-", "CO_{3}^{2-}"),
    ("HCO3-", "HCO_{3}^{-}"),
    ("NH4+", "NH_{4}^{+}"),
    ("H3O+", "H_{3}O^{+}"),
    ("OH-", "OH^{-}"),
    ("MnO4-", "MnO_{4}^{-}"),
    ("Cr2O72-", "Cr_{2}O_{7}^{2-}"),
    ("CrO42-", "CrO_{4}^{2-}"),
    ("HPO42-", "HPO_{4}^{2-}"),
    ("H2PO4-", "H_{2}PO_{4}^{-}"),
    ("HSO4-", "HSO_{4}^{-}"),
    ("C2O42-", "C_{2}O_{4}^{2-}"),
    ("S2O32-", "S_{2}O_{3}^{2-}"),
    ("SCN-", "SCN^{-}"),
    ("CN-", "CN^{-}"),
    ("ClO3-", "ClO_{3}^{-}"),
    ("ClO4-", "ClO_{4}^{-}"),
    ("Ca2+", "Ca^{2+}"),
    ("Mg2+", "Mg^{2+}"),
    ("Fe2+", "Fe^{2+}"),
    ("Fe3+", "Fe^{3+}"),
    ("Al3+", "Al^{3+}"),
    ("Cu2+", "Cu^{2+}"),
    ("Zn2+", "Zn^{2+}"),
    ("Na+", "Na^{+}"),
    ("Ag+", "Ag^{+}"),
    ("H+", "H^{+}"),
    ("Cl-", "Cl^{-}"),
    ("Br-", "Br^{-}"),
    ("O2-", "O^{2-}"),
    ("S2-", "S^{2-}"),
    // neutral compounds
    ("H2O", "H_{2}O"),
    ("H2O2", "H_{2}O_{2}"),
    ("H2SO4", "H_{2}SO_{4}"),
    ("HNO3", "HNO_{3}"),
    ("H3PO4", "H_{3}PO_{4}"),
    ("H2CO3", "H_{2}CO_{3}"),
    ("CO2", "CO_{2}"),
    ("SO2", "SO_{2}"),
    ("SO3", "SO_{3}"),
    ("NO2", "NO_{2}"),
    ("N2O", "N_{2}O"),
    ("N2", "N_{2}"),
    ("O2", "O_{2}"),
    ("O3", "O_{3}"),
    ("H2", "H_{2}"),
    ("Cl2", "Cl_{2}"),
    ("NH3", "NH_{3}"),
    ("CH4", "CH_{4}"),
    ("C2H6", "C_{2}H_{6}"),
    ("C2H4", "C_{2}H_{4}"),
    ("C2H2", "C_{2}H_{2}"),
    ("C6H6", "C_{6}H_{6}"),
    ("C6H12O6", "C_{6}H_{12}O_{6}"),
    ("C2H5OH", "C_{2}H_{5}OH"),
    ("CH3COOH", "CH_{3}COOH"),
    ("CH3OH", "CH_{3}OH"),
    ("CCl4", "CCl_{4}"),
    ("CHCl3", "CHCl_{3}"),
    ("Ca(OH)2", "Ca(OH)_{2}"),
    ("Mg(OH)2", "Mg(OH)_{2}"),
    ("CaCO3", "CaCO_{3}"),
    ("Na2CO3", "Na_{2}CO_{3}"),
    ("NaHCO3", "NaHCO_{3}"),
    ("KMnO4", "KMnO_{4}"),
    ("K2Cr2O7", "K_{2}Cr_{2}O_{7}"),
    ("CuSO4", "CuSO_{4}"),
    ("FeSO4", "FeSO_{4}"),
    ("Fe2O3", "Fe_{2}O_{3}"),
    ("Al2O3", "Al_{2}O_{3}"),
    ("P4O10", "P_{4}O_{10}"),
    ("CaCl2", "CaCl_{2}"),
    ("BaCl2", "BaCl_{2}"),
    ("ZnSO4", "ZnSO_{4}"),
    ("AgNO3", "AgNO_{3}"),
    ("CaSO4", "CaSO_{4}"),
    ("Na2SO4", "Na_{2}SO_{4}"),
    ("SiO2", "SiO_{2}"),
];

static CHEMISTRY_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    let mut rules = vec![
        Rule::new(r"\s*<=>\s*", r" \rightleftharpoons "),
        Rule::new(r"\s*->\s*", r" \rightarrow "),
    ];

    let mut compounds: Vec<&(&str, &str)> = COMPOUNDS.iter().collect();
    compounds.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    for (formula, markup) in compounds {
        // a charge sign already ends the token; alphanumeric endings need a boundary
        let suffix = if formula.ends_with(|c: char| c.is_ascii_alphanumeric()) {
            r"\b"
        } else {
            ""
        };
        let pattern = format!(r"(^|[^A-Za-z]){}{}", regex::escape(formula), suffix);
        rules.push(Rule::new(&pattern, &format!("${{1}}{}", markup)));
    }

    // single-element ions only, and only when the sign closes the token so
    // `R1+R2` stays a sum; runs before the subscript rule eats the digit
    rules.push(Rule::new(
        r"\b([A-Z][a-z]?)(\d)([+-])(\s|$|[),.;])",
        r"${1}^{${2}${3}}${4}",
    ));
    rules.push(Rule::new(r"([A-Z][a-z]?|\))(\d+)", r"${1}_{${2}}"));
    rules
});

static MATH_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        // an existing `\command` is never prefixed again
        Rule::new(
            r"(^|[^\\A-Za-z])(alpha|beta|gamma|delta|epsilon|theta|lambda|mu|pi|rho|sigma|tau|phi|omega|Delta|Sigma|Omega)\b",
            r"${1}\${2}",
        ),
        Rule::new(r"\bsqrt\(([^()]*)\)", r"\sqrt{${1}}"),
        Rule::new(r"\b(\d+)/(\d+)\b", r"\frac{${1}}{${2}}"),
        Rule::new(r"([A-Za-z0-9)\]])\^(-?[A-Za-z0-9]+)", r"${1}^{${2}}"),
        Rule::new(r"\s*<=\s*", r" \leq "),
        Rule::new(r"\s*>=\s*", r" \geq "),
        Rule::new(r"\s*!=\s*", r" \neq "),
        Rule::new(r"\+/-", r"\pm "),
        Rule::new(r"\binfinity\b", r"\infty"),
    ]
});

fn apply_layer<'a>(rules: &[Rule], text: Cow<'a, str>) -> Cow<'a, str> {
    rules.iter().fold(text, |acc, rule| rule.apply(acc))
}

/// Converts physics, chemistry and math shorthand into LaTeX markup.
///
/// Total and pure: unrecognized text is returned unchanged.
pub fn normalize(text: &str) -> String {
    let text = apply_layer(&PHYSICS_RULES, Cow::Borrowed(text));
    let text = apply_layer(&CHEMISTRY_RULES, text);
    apply_layer(&MATH_RULES, text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_unchanged() {
        for s in [
            "",
            "Which of the following is correct?",
            "The mitochondria is the powerhouse of the cell.",
            "Select the odd one out: apple, mango, banana",
        ] {
            assert_eq!(normalize(s), s);
        }
    }

    #[test]
    fn test_known_compounds() {
        assert_eq!(normalize("H2SO4"), "H_{2}SO_{4}");
        assert_eq!(normalize("H2O2"), "H_{2}O_{2}");
        assert_eq!(normalize("Boil H2O quickly"), "Boil H_{2}O quickly");
        assert_eq!(normalize("C6H12O6"), "C_{6}H_{12}O_{6}");
    }

    #[test]
    fn test_charged_ion_gets_superscript() {
        let out = normalize("SO42-");
        assert_eq!(out, "SO_{4}^{2-}");
        assert!(!out.contains("_{42}"));

        assert_eq!(normalize("Ca2+ ions"), "Ca^{2+} ions");
        assert_eq!(normalize("NH4+"), "NH_{4}^{+}");
    }

    #[test]
    fn test_generic_charge_before_subscript() {
        assert_eq!(normalize("Ba2+"), "Ba^{2+}");
        assert_eq!(normalize("Ba2+ and Sr2+ ions"), "Ba^{2+} and Sr^{2+} ions");
        assert_eq!(normalize("(Pb2+)"), "(Pb^{2+})");
    }

    #[test]
    fn test_indexed_sums_keep_their_operator() {
        assert_eq!(normalize("R = R1+R2"), "R = R_{1}+R_{2}");
        assert_eq!(normalize("F1+F2"), "F_{1}+F_{2}");
        assert_eq!(normalize("T1-T2"), "T_{1}-T_{2}");
    }

    #[test]
    fn test_polyatomic_ions_from_table() {
        let out = normalize("HPO42-");
        assert_eq!(out, "HPO_{4}^{2-}");
        assert!(!out.contains("_{42}"));
        assert_eq!(normalize("H2PO4- and HSO4-"), "H_{2}PO_{4}^{-} and HSO_{4}^{-}");
        assert_eq!(normalize("SCN-"), "SCN^{-}");
    }

    #[test]
    fn test_generic_subscript_for_unknown_formula() {
        assert_eq!(normalize("XeF4"), "XeF_{4}");
        assert_eq!(normalize("Al(NO3)3"), "Al(NO_{3})_{3}");
        assert_eq!(normalize("2H2O"), "2H_{2}O");
    }

    #[test]
    fn test_subscript_markup_not_reapplied() {
        assert_eq!(normalize("H_{2}O"), "H_{2}O");
        assert_eq!(normalize("x^{2}"), "x^{2}");
    }

    #[test]
    fn test_reaction_arrows() {
        assert_eq!(normalize("N2 + H2 <=> NH3"), "N_{2} + H_{2} \\rightleftharpoons NH_{3}");
        assert_eq!(normalize("CaCO3 -> CaO + CO2"), "CaCO_{3} \\rightarrow CaO + CO_{2}");
    }

    #[test]
    fn test_physics_rules() {
        assert_eq!(normalize("c = 3x10^8 m/s"), "c = 3 \\times 10^{8} m/s");
        assert_eq!(normalize("e = 1.6 * 10^-19 C"), "e = 1.6 \\times 10^{-19} C");
        assert_eq!(normalize("g = 9.8 m/s2"), "g = 9.8 m/s^{2}");
        assert_eq!(normalize("R = 10 ohm"), "R = 10 \\Omega");
        assert_eq!(normalize("v = v0 + at"), "v = v_{0} + at");
        assert_eq!(normalize("F=ma"), "F=ma");
        assert_eq!(normalize("25°C"), "25^{\\circ}C");
    }

    #[test]
    fn test_physics_markup_survives_later_layers() {
        // neither the Omega command nor the braced exponent is touched again
        assert_eq!(normalize("5 ohms and omega"), "5 \\Omega and \\omega");
        assert_eq!(normalize("6x10^23"), "6 \\times 10^{23}");
    }

    #[test]
    fn test_generic_math() {
        assert_eq!(normalize("x^2 + y^2"), "x^{2} + y^{2}");
        assert_eq!(normalize("1/2"), "\\frac{1}{2}");
        assert_eq!(normalize("sin theta"), "sin \\theta");
        assert_eq!(normalize("sqrt(2)"), "\\sqrt{2}");
        assert_eq!(normalize("a<=b"), "a \\leq b");
        assert_eq!(normalize("e^-x"), "e^{-x}");
        assert_eq!(normalize("2pi r"), "2\\pi r");
    }
}
