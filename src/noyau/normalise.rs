// src/noyau/normalise.rs
//
// Normalisation : notation “humaine” -> forme canonique évaluable
// ----------------------------------------------------------------
// Ordre FIXE (une substitution ne doit pas re-matcher le texte d’une autre) :
//   1) espaces retirés
//   2) fonctions + constante : log( -> log10( ; sin/cos/tan/sqrt/ln ; √ ; π/pi -> PI
//   3) ^ -> **
//   4) 1.5×10⁴ -> 1.5e4 ; puis × -> * et ÷ -> /
//   5) multiplication implicite : 2( , )2 , 2PI , PI2 , )(
//   6) trig : argument sans PI => degrés, converti en (arg)*PI/180
//
// Le normaliseur est tolérant : il ne valide rien. Les erreurs de syntaxe
// remontent à l’évaluation (jetons / rpn).

use super::format::exposant_vers_ascii;

/// Constante π sous forme canonique.
pub const CONSTANTE_PI: &str = "PI";

/// Fonctions trig soumises à la règle degrés/radians.
const FONCTIONS_TRIG: [&str; 3] = ["sin", "cos", "tan"];

/// Pipeline complet (étapes 1 à 6).
pub fn normalise(brut: &str) -> String {
    let s = retire_espaces(brut);
    let s = canonise_fonctions(&s);
    let s = s.replace('^', "**");
    let s = reecrit_scientifique(&s);
    let s = s.replace('×', "*").replace('÷', "/");
    let s = multiplication_implicite(&s);
    convertit_trig(&s)
}

/* ------------------------ 1) espaces ------------------------ */

fn retire_espaces(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/* ------------------------ 2) fonctions + π ------------------------ */

/// Début de mot : pas de lettre (ni '_') juste avant.
/// Un chiffre avant est accepté : "3pi" => 3 puis "pi".
fn est_debut_mot(chars: &[char], i: usize) -> bool {
    i == 0 || !(chars[i - 1].is_ascii_alphabetic() || chars[i - 1] == '_')
}

fn canonise_fonctions(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == 'π' {
            out.push_str(CONSTANTE_PI);
            i += 1;
            continue;
        }

        // √( => sqrt( ; √9 => sqrt(9) ; √π => sqrt(PI)
        if c == '√' {
            i += 1;
            if i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                let debut = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let nombre: String = chars[debut..i].iter().collect();
                out.push_str(&format!("sqrt({nombre})"));
            } else if i < chars.len() && chars[i] == 'π' {
                out.push_str(&format!("sqrt({CONSTANTE_PI})"));
                i += 1;
            } else {
                out.push_str("sqrt");
            }
            continue;
        }

        if c.is_ascii_alphabetic() && est_debut_mot(&chars, i) {
            let debut = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let mot: String = chars[debut..i].iter().collect();
            let appel = i < chars.len() && chars[i] == '(';
            let bas = mot.to_lowercase();

            match bas.as_str() {
                "log" if appel => out.push_str("log10"),
                "ln" | "sin" | "cos" | "tan" | "sqrt" | "log10" if appel => out.push_str(&bas),
                "pi" => out.push_str(CONSTANTE_PI),
                _ => out.push_str(&mot),
            }
            continue;
        }

        out.push(c);
        i += 1;
    }

    out
}

/* ------------------------ 4) notation du formateur ------------------------ */

/// "1.5×10⁴" => "1.5e4" (les exposants viennent de format_nombre).
/// Un "×10" sans exposant reste une multiplication.
fn reecrit_scientifique(s: &str) -> String {
    const MARQUE: &str = "×10";

    let mut out = String::with_capacity(s.len());
    let mut reste = s;

    while let Some(pos) = reste.find(MARQUE) {
        out.push_str(&reste[..pos]);
        let apres = &reste[pos + MARQUE.len()..];

        let fin = apres
            .char_indices()
            .find(|(_, c)| exposant_vers_ascii(*c).is_none())
            .map_or(apres.len(), |(k, _)| k);

        if fin == 0 {
            out.push_str(MARQUE);
        } else {
            out.push('e');
            out.extend(apres[..fin].chars().filter_map(exposant_vers_ascii));
        }
        reste = &apres[fin..];
    }

    out.push_str(reste);
    out
}

/* ------------------------ 5) multiplication implicite ------------------------ */

/// Vrai si `out` se termine par un nombre (et non par un identifiant comme "log10").
fn finit_par_nombre(out: &[char]) -> bool {
    let Some(&dernier) = out.last() else {
        return false;
    };
    if !(dernier.is_ascii_digit() || dernier == '.') {
        return false;
    }

    let mut k = out.len();
    while k > 0 && (out[k - 1].is_ascii_digit() || out[k - 1] == '.') {
        k -= 1;
    }
    if k == 0 {
        return true;
    }

    let avant = out[k - 1];
    // exposant d’un nombre : 2e5, 1.5e-7
    if (avant == 'e' || avant == 'E') && k >= 2 && out[k - 2].is_ascii_digit() {
        return true;
    }
    if (avant == '-' || avant == '+')
        && k >= 3
        && (out[k - 2] == 'e' || out[k - 2] == 'E')
        && out[k - 3].is_ascii_digit()
    {
        return true;
    }

    !(avant.is_ascii_alphabetic() || avant == '_')
}

fn finit_par_pi(out: &[char]) -> bool {
    out.ends_with(&['P', 'I'])
}

fn multiplication_implicite(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out: Vec<char> = Vec::with_capacity(chars.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let debut_pi = chars[i..].starts_with(&['P', 'I']);
        let chiffre = c.is_ascii_digit() || c == '.';

        let insere = match out.last() {
            None => false,
            Some(&p) => {
                (c == '(' && (p == ')' || finit_par_nombre(&out)))
                    || (chiffre && p == ')')
                    || (debut_pi && finit_par_nombre(&out))
                    || (chiffre && finit_par_pi(&out))
            }
        };
        if insere {
            out.push('*');
        }

        if debut_pi {
            out.extend(['P', 'I']);
            i += 2;
        } else {
            out.push(c);
            i += 1;
        }
    }

    out.into_iter().collect()
}

/* ------------------------ 6) degrés / radians ------------------------ */

/// Index de la parenthèse fermante associée à `ouvrante` (None si non équilibré).
fn fermante_associee(chars: &[char], ouvrante: usize) -> Option<usize> {
    let mut profondeur = 0usize;
    for (k, &c) in chars.iter().enumerate().skip(ouvrante) {
        match c {
            '(' => profondeur += 1,
            ')' => {
                profondeur -= 1;
                if profondeur == 0 {
                    return Some(k);
                }
            }
            _ => {}
        }
    }
    None
}

/// Règle : un argument qui contient PI est déjà en radians ; sinon il est en degrés.
/// La décision porte sur le texte saisi (avant conversion des appels imbriqués).
fn convertit_trig(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 16);
    let mut i = 0;

    while i < chars.len() {
        let trig = FONCTIONS_TRIG.iter().find(|nom| {
            let motif: Vec<char> = nom.chars().chain(['(']).collect();
            est_debut_mot(&chars, i) && chars[i..].starts_with(&motif)
        });

        let Some(nom) = trig else {
            out.push(chars[i]);
            i += 1;
            continue;
        };

        let ouvrante = i + nom.len();
        let (fin_arg, suite) = match fermante_associee(&chars, ouvrante) {
            Some(f) => (f, f + 1),
            None => (chars.len(), chars.len()),
        };
        let argument: String = chars[ouvrante + 1..fin_arg].iter().collect();
        let interieur = convertit_trig(&argument);
        let ferme = if suite > fin_arg { ")" } else { "" };

        if argument.is_empty() || argument.contains(CONSTANTE_PI) {
            out.push_str(&format!("{nom}({interieur}{ferme}"));
        } else {
            out.push_str(&format!("{nom}(({interieur})*{CONSTANTE_PI}/180{ferme}"));
        }
        i = suite;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplication_implicite_parenthese() {
        assert_eq!(normalise("2(3+4)"), "2*(3+4)");
        assert_eq!(normalise("(1+2)(3)"), "(1+2)*(3)");
        assert_eq!(normalise("(1+2)3"), "(1+2)*3");
    }

    #[test]
    fn constante_pi_et_juxtaposition() {
        assert_eq!(normalise("3π"), "3*PI");
        assert_eq!(normalise("π2"), "PI*2");
        assert_eq!(normalise("2 pi"), "2*PI");
    }

    #[test]
    fn espaces_et_puissance() {
        assert_eq!(normalise(" 2 ^ 3 "), "2**3");
        assert_eq!(normalise("6 × 7 ÷ 2"), "6*7/2");
    }

    #[test]
    fn log_devient_base_dix_sans_multiplier_le_10() {
        assert_eq!(normalise("log(100)"), "log10(100)");
        assert_eq!(normalise("log10(5)"), "log10(5)");
        assert_eq!(normalise("ln(1)"), "ln(1)");
    }

    #[test]
    fn racine_unicode() {
        assert_eq!(normalise("√9"), "sqrt(9)");
        assert_eq!(normalise("√(16)"), "sqrt(16)");
    }

    #[test]
    fn trig_en_degres_par_defaut() {
        assert_eq!(normalise("sin(30)"), "sin((30)*PI/180)");
        assert_eq!(normalise("cos(60)+1"), "cos((60)*PI/180)+1");
    }

    #[test]
    fn trig_avec_pi_reste_en_radians() {
        assert_eq!(normalise("sin(π/6)"), "sin(PI/6)");
        // heuristique syntaxique : tout l’argument passe en radians
        assert_eq!(normalise("sin(π+10)"), "sin(PI+10)");
    }

    #[test]
    fn trig_imbriquee_decide_sur_le_texte_saisi() {
        assert_eq!(
            normalise("sin(cos(0))"),
            "sin((cos((0)*PI/180))*PI/180)"
        );
        assert_eq!(normalise("sin((1+2)*10)"), "sin(((1+2)*10)*PI/180)");
    }

    #[test]
    fn notation_du_formateur_relue() {
        assert_eq!(normalise("1.5×10⁴"), "1.5e4");
        assert_eq!(normalise("2×10⁻⁷+1"), "2e-7+1");
        assert_eq!(normalise("3×10"), "3*10");
    }

    #[test]
    fn exposant_pas_pris_pour_un_mot() {
        assert_eq!(normalise("2e5(1)"), "2e5*(1)");
    }
}
