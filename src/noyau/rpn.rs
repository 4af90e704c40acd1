// src/noyau/rpn.rs
//
// Shunting-yard -> RPN -> valeur (f64)
// Objectif:
// - Convertir une suite de Tok en RPN (postfix)
// - Puis évaluer la RPN sur une pile de f64
//
// Règles:
// - Ident(name):
//    - si name ∈ {sin, cos, tan, sqrt, log10, ln} => fonction unaire (postfixée en RPN)
//    - sinon => référence inconnue (erreur)
// - Moins unaire:
//    - si '-' arrive quand on n’attend PAS une valeur, il devient Neg (préfixe)
//    - précédence : + - < * / < Neg < **   (donc -2**2 = -4, 2**-1 = 0.5)
// - Plus unaire : ignoré.
//
// NOTE:
// - Les fonctions sont traitées comme des opérateurs “collés” à leur argument
//   et sont sorties après la parenthèse fermante.

use super::erreur::ErreurCalcul;
use super::jetons::Tok;

fn precedence(t: &Tok) -> i32 {
    match t {
        Tok::Plus | Tok::Minus => 1,
        Tok::Star | Tok::Slash => 2,
        Tok::Neg => 3,
        Tok::Puissance => 4,
        _ => 0,
    }
}

fn is_right_associative(t: &Tok) -> bool {
    matches!(t, Tok::Puissance | Tok::Neg)
}

/// Identificateurs reconnus comme fonctions (unaire).
fn is_fonction_ident(name: &str) -> bool {
    matches!(name, "sin" | "cos" | "tan" | "sqrt" | "log10" | "ln")
}

fn is_fonction(t: &Tok) -> bool {
    matches!(t, Tok::Ident(name) if is_fonction_ident(name))
}

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Exemple:
///   tokens: [Ident("sin"), LPar, Pi, Slash, Num(2), RPar]
///   rpn:    [Pi, Num(2), Slash, Ident("sin")]
pub fn to_rpn(tokens: &[Tok]) -> Result<Vec<Tok>, ErreurCalcul> {
    let mut out: Vec<Tok> = Vec::new();
    let mut ops: Vec<Tok> = Vec::new();

    // “valeur” = un atome ou une expression fermée.
    // Sert à détecter le moins unaire.
    let mut prev_was_value = false;

    for tok in tokens.iter().cloned() {
        match tok {
            Tok::Num(_) | Tok::Pi => {
                out.push(tok);
                prev_was_value = true;
            }

            Tok::Ident(name) => {
                if !is_fonction_ident(&name) {
                    return Err(ErreurCalcul::ReferenceInconnue(name));
                }
                // fonction : on la garde sur la pile (elle sortira après son argument)
                ops.push(Tok::Ident(name));
                prev_was_value = false;
            }

            Tok::LPar => {
                ops.push(tok);
                prev_was_value = false;
            }

            Tok::RPar => {
                // dépile jusqu’à '('
                let mut ouverte = false;
                while let Some(top) = ops.pop() {
                    if matches!(top, Tok::LPar) {
                        ouverte = true;
                        break;
                    }
                    out.push(top);
                }
                if !ouverte {
                    return Err(ErreurCalcul::ParentheseFermante);
                }

                // si une fonction est au sommet, on la sort aussi
                if ops.last().is_some_and(is_fonction) {
                    if let Some(f) = ops.pop() {
                        out.push(f);
                    }
                }

                prev_was_value = true;
            }

            Tok::Minus if !prev_was_value => {
                // préfixe : empilé sans rien dépiler
                ops.push(Tok::Neg);
            }

            Tok::Plus if !prev_was_value => {}

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Puissance | Tok::Neg => {
                // dépile tant que:
                // - on n'est pas bloqué par '('
                // - et on ne traverse pas une fonction (fonction reste collée à son argument)
                // - et la précédence/associativité exige de sortir l'opérateur du haut
                while let Some(top) = ops.last() {
                    if matches!(top, Tok::LPar) || is_fonction(top) {
                        break;
                    }

                    let p_top = precedence(top);
                    let p_tok = precedence(&tok);

                    let doit_pop = if is_right_associative(&tok) {
                        p_top > p_tok
                    } else {
                        p_top >= p_tok
                    };

                    if !doit_pop {
                        break;
                    }
                    if let Some(op) = ops.pop() {
                        out.push(op);
                    }
                }

                ops.push(tok);
                prev_was_value = false;
            }
        }
    }

    // vide la pile ops
    while let Some(op) = ops.pop() {
        if matches!(op, Tok::LPar) {
            return Err(ErreurCalcul::ParentheseOuverte);
        }
        out.push(op);
    }

    Ok(out)
}

fn applique_fonction(name: &str, x: f64) -> Result<f64, ErreurCalcul> {
    let v = match name {
        "sin" => x.sin(),
        "cos" => x.cos(),
        "tan" => x.tan(),
        "sqrt" => x.sqrt(),
        "log10" => x.log10(),
        "ln" => x.ln(),
        _ => return Err(ErreurCalcul::ReferenceInconnue(name.to_string())),
    };
    Ok(v)
}

/// Évalue une RPN (pile de f64).
pub fn eval_rpn(rpn: &[Tok]) -> Result<f64, ErreurCalcul> {
    let mut st: Vec<f64> = Vec::new();

    for tok in rpn {
        match tok {
            Tok::Num(n) => st.push(*n),
            Tok::Pi => st.push(std::f64::consts::PI),

            Tok::Neg => {
                let a = st.pop().ok_or(ErreurCalcul::ExpressionInvalide)?;
                st.push(-a);
            }

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Puissance => {
                let b = st.pop().ok_or(ErreurCalcul::ExpressionInvalide)?;
                let a = st.pop().ok_or(ErreurCalcul::ExpressionInvalide)?;

                let v = match tok {
                    Tok::Plus => a + b,
                    Tok::Minus => a - b,
                    Tok::Star => a * b,
                    Tok::Slash => a / b,
                    _ => a.powf(b),
                };
                st.push(v);
            }

            Tok::Ident(name) => {
                let x = st.pop().ok_or(ErreurCalcul::ExpressionInvalide)?;
                st.push(applique_fonction(name, x)?);
            }

            Tok::LPar | Tok::RPar => return Err(ErreurCalcul::ExpressionInvalide),
        }
    }

    match st.as_slice() {
        [v] => Ok(*v),
        _ => Err(ErreurCalcul::ExpressionInvalide),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::jetons::tokenize;

    fn calc(s: &str) -> Result<f64, ErreurCalcul> {
        let t = tokenize(s)?;
        eval_rpn(&to_rpn(&t)?)
    }

    #[test]
    fn precedence_usuelle() {
        assert_eq!(calc("2+3*4"), Ok(14.0));
        assert_eq!(calc("(2+3)*4"), Ok(20.0));
        assert_eq!(calc("10-4-3"), Ok(3.0));
        assert_eq!(calc("8/4/2"), Ok(1.0));
    }

    #[test]
    fn puissance_associative_a_droite() {
        assert_eq!(calc("2**3**2"), Ok(512.0));
    }

    #[test]
    fn moins_unaire() {
        assert_eq!(calc("-2**2"), Ok(-4.0));
        assert_eq!(calc("2**-1"), Ok(0.5));
        assert_eq!(calc("3*-2"), Ok(-6.0));
        assert_eq!(calc("-(1+2)"), Ok(-3.0));
        assert_eq!(calc("--3"), Ok(3.0));
    }

    #[test]
    fn fonctions_collees() {
        assert_eq!(calc("sqrt(9)+1"), Ok(4.0));
        assert!((calc("log10(1000)").unwrap() - 3.0).abs() < 1e-12);
        assert_eq!(calc("-sqrt(4)"), Ok(-2.0));
    }

    #[test]
    fn rpn_de_sin() {
        let t = tokenize("sin(PI/2)").unwrap();
        let r = to_rpn(&t).unwrap();
        assert_eq!(
            r,
            vec![Tok::Pi, Tok::Num(2.0), Tok::Slash, Tok::Ident("sin".into())]
        );
    }

    #[test]
    fn erreurs_de_structure() {
        assert_eq!(calc("(1+2"), Err(ErreurCalcul::ParentheseOuverte));
        assert_eq!(calc("1+2)"), Err(ErreurCalcul::ParentheseFermante));
        assert_eq!(calc("1+"), Err(ErreurCalcul::ExpressionInvalide));
        assert_eq!(calc("()"), Err(ErreurCalcul::ExpressionInvalide));
        assert_eq!(
            calc("foo(1)"),
            Err(ErreurCalcul::ReferenceInconnue("foo".into()))
        );
    }
}
