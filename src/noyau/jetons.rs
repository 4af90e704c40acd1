// src/noyau/jetons.rs

use super::erreur::ErreurCalcul;
use super::normalise::CONSTANTE_PI;

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Num(f64),
    Pi,

    // Fonctions (sin, cos, tan, sqrt, log10, ln) ou références inconnues.
    // NOTE: le passage en RPN décidera si le nom est une fonction reconnue.
    Ident(String),

    Plus,
    Minus,
    Star,
    Slash,
    Puissance, // **

    // Moins unaire : produit seulement par to_rpn (jamais par tokenize).
    Neg,

    LPar,
    RPar,
}

/// Tokenize la forme canonique (sortie de `normalise`).
/// Supporte:
/// - nombres décimaux (12, 1.5, .5) avec exposant optionnel (1.5e-7)
/// - opérateurs + - * / et ** (puissance)
/// - parenthèses ( )
/// - constante PI
/// - identifiants [a-zA-Z_][a-zA-Z0-9_]*
pub fn tokenize(s: &str) -> Result<Vec<Tok>, ErreurCalcul> {
    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        match c {
            '(' => {
                out.push(Tok::LPar);
                i += 1;
                continue;
            }
            ')' => {
                out.push(Tok::RPar);
                i += 1;
                continue;
            }
            '+' => {
                out.push(Tok::Plus);
                i += 1;
                continue;
            }
            '-' => {
                out.push(Tok::Minus);
                i += 1;
                continue;
            }
            '*' => {
                if i + 1 < chars.len() && chars[i + 1] == '*' {
                    out.push(Tok::Puissance);
                    i += 2;
                } else {
                    out.push(Tok::Star);
                    i += 1;
                }
                continue;
            }
            '/' => {
                out.push(Tok::Slash);
                i += 1;
                continue;
            }
            _ => {}
        }

        // Identifiants ASCII : [a-zA-Z_][a-zA-Z0-9_]*
        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            i += 1;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            if word == CONSTANTE_PI {
                out.push(Tok::Pi);
            } else {
                out.push(Tok::Ident(word));
            }
            continue;
        }

        // Nombre : chiffres + point, puis exposant e[+-]chiffres si présent
        if c.is_ascii_digit() || c == '.' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }

            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut k = i + 1;
                if k < chars.len() && (chars[k] == '+' || chars[k] == '-') {
                    k += 1;
                }
                if k < chars.len() && chars[k].is_ascii_digit() {
                    while k < chars.len() && chars[k].is_ascii_digit() {
                        k += 1;
                    }
                    i = k;
                }
            }

            let texte: String = chars[start..i].iter().collect();
            let n = texte
                .parse::<f64>()
                .map_err(|_| ErreurCalcul::NombreInvalide(texte.clone()))?;
            out.push(Tok::Num(n));
            continue;
        }

        return Err(ErreurCalcul::CaractereInattendu(c));
    }

    Ok(out)
}

/// Format utilitaire (debug/“démarche”) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Tok]) -> String {
    let mut out = Vec::new();
    for t in tokens {
        let s = match t {
            Tok::Num(n) => format!("{n}"),
            Tok::Pi => "π".to_string(),
            Tok::Ident(name) => name.clone(),

            Tok::Plus => "+".to_string(),
            Tok::Minus => "-".to_string(),
            Tok::Star => "*".to_string(),
            Tok::Slash => "/".to_string(),
            Tok::Puissance => "^".to_string(),
            Tok::Neg => "neg".to_string(),

            Tok::LPar => "(".to_string(),
            Tok::RPar => ")".to_string(),
        };
        out.push(s);
    }
    out.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nombres_et_operateurs() {
        let t = tokenize("2*(3+4)").unwrap();
        assert_eq!(
            t,
            vec![
                Tok::Num(2.0),
                Tok::Star,
                Tok::LPar,
                Tok::Num(3.0),
                Tok::Plus,
                Tok::Num(4.0),
                Tok::RPar
            ]
        );
    }

    #[test]
    fn puissance_double_etoile() {
        let t = tokenize("2**3").unwrap();
        assert_eq!(t, vec![Tok::Num(2.0), Tok::Puissance, Tok::Num(3.0)]);
    }

    #[test]
    fn exposant_scientifique() {
        assert_eq!(tokenize("1.5e-7").unwrap(), vec![Tok::Num(1.5e-7)]);
        assert_eq!(tokenize("2e5").unwrap(), vec![Tok::Num(2e5)]);
    }

    #[test]
    fn constante_et_fonctions() {
        let t = tokenize("log10(PI)").unwrap();
        assert_eq!(
            t,
            vec![Tok::Ident("log10".into()), Tok::LPar, Tok::Pi, Tok::RPar]
        );
    }

    #[test]
    fn caractere_inattendu() {
        assert_eq!(
            tokenize("2#3"),
            Err(ErreurCalcul::CaractereInattendu('#'))
        );
    }

    #[test]
    fn nombre_a_deux_points() {
        assert!(matches!(
            tokenize("1.2.3"),
            Err(ErreurCalcul::NombreInvalide(_))
        ));
    }
}
