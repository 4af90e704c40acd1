// src/noyau/format.rs
//
// Affichage des nombres (bidirectionnel)
// - format_nombre        : 1.23e25 -> "1.23×10²⁵"
// - parse_nombre_formate : "1.23×10²⁵" -> "1.23e25" (relisible par l’évaluateur)

/// Marqueur de la notation scientifique affichée.
pub const MARQUE_PUISSANCE_DIX: &str = "×10";

/// Chiffres en exposant, indexés par leur valeur.
const EXPOSANTS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];
const EXPOSANT_MOINS: char = '⁻';

/// Décimales gardées sur la mantisse.
const DECIMALES_MANTISSE: usize = 8;

/// '4' -> '⁴', '-' -> '⁻'
fn ascii_vers_exposant(c: char) -> Option<char> {
    match c {
        '-' => Some(EXPOSANT_MOINS),
        '0'..='9' => c.to_digit(10).map(|d| EXPOSANTS[d as usize]),
        _ => None,
    }
}

/// '⁴' -> '4', '⁻' -> '-' ; None si ce n’est pas un exposant.
pub fn exposant_vers_ascii(c: char) -> Option<char> {
    if c == EXPOSANT_MOINS {
        return Some('-');
    }
    EXPOSANTS
        .iter()
        .position(|&e| e == c)
        .and_then(|d| char::from_digit(d as u32, 10))
}

/// Forme texte “à la JS” : exponentielle au-delà de 1e21 ou sous 1e-6.
fn forme_texte(x: f64) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    let m = x.abs();
    if x.is_finite() && (m >= 1e21 || m < 1e-6) {
        format!("{x:e}")
    } else {
        format!("{x}")
    }
}

/// Mantisse coupée à 8 décimales, zéros finaux retirés.
fn coupe_mantisse(base: &str) -> String {
    match base.parse::<f64>() {
        Ok(m) => {
            let t = format!("{m:.prec$}", prec = DECIMALES_MANTISSE);
            t.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        Err(_) => base.to_string(),
    }
}

/// Nombre -> texte d’affichage.
///
/// Les grandes et petites magnitudes passent en notation `M×10ᴱ`
/// (exposant en chiffres suscrits), le reste en décimal simple.
pub fn format_nombre(x: f64) -> String {
    let s = forme_texte(x);
    let Some((base, exposant)) = s.split_once('e') else {
        return s;
    };

    let mantisse = coupe_mantisse(base);
    let exp: String = exposant.chars().filter_map(ascii_vers_exposant).collect();
    format!("{mantisse}{MARQUE_PUISSANCE_DIX}{exp}")
}

/// Inverse de format_nombre : "1.5×10⁻⁷" -> "1.5e-7".
/// Sans marqueur, le texte est rendu tel quel.
pub fn parse_nombre_formate(s: &str) -> String {
    match s.split_once(MARQUE_PUISSANCE_DIX) {
        Some((base, exposant)) => {
            let exp: String = exposant
                .chars()
                .map(|c| exposant_vers_ascii(c).unwrap_or(c))
                .collect();
            format!("{base}e{exp}")
        }
        None => s.to_string(),
    }
}
