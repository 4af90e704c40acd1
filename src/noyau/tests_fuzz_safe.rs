//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée
//! - budget temps global
//! - on accepte les erreurs attendues (division par zéro, racine négative, etc.)
//! - invariants clés :
//!     * un Ok est toujours fini, et vaut 0 ou |x| >= 1e-10
//!     * format -> relecture -> évaluation redonne la valeur
//!     * la calculatrice n’affiche que un nombre ou "Erreur"

use std::time::{Duration, Instant};

use super::calculatrice::{Calculatrice, JETON_ERREUR};
use super::erreur::ErreurCalcul;
use super::eval::SEUIL_ZERO;
use super::eval_expression;
use super::format::{format_nombre, parse_nombre_formate};

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Helpers fuzz ------------------------ */

fn is_erreur_attendue(e: &ErreurCalcul) -> bool {
    // Liste blanche : erreurs *normales* pour un fuzz arithmétique
    // (1/0, sqrt(-1), ln(0), 10^400 ...).
    matches!(e, ErreurCalcul::NonFini)
}

fn check_invariant_valeur(expr: &str, v: f64) {
    assert!(v.is_finite(), "expr={expr:?} valeur non finie {v}");
    assert!(
        v == 0.0 || v.abs() >= SEUIL_ZERO,
        "expr={expr:?} résidu non ramené à zéro: {v}"
    );
}

fn check_aller_retour(expr: &str, v: f64) {
    let relu = parse_nombre_formate(&format_nombre(v));
    let w = eval_expression(&relu).unwrap_or_else(|e| panic!("expr={expr:?} relu={relu:?} err={e}"));
    if v == 0.0 {
        assert_eq!(w, 0.0, "expr={expr:?}");
    } else {
        assert!(((w - v) / v).abs() < 1e-8, "expr={expr:?} v={v} w={w}");
    }
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

fn gen_nombre(rng: &mut Rng) -> String {
    match rng.pick(6) {
        0 => "0".to_string(),
        1 => format!("{}", rng.pick(10)),
        2 => format!("{}.{}", rng.pick(100), rng.pick(100)),
        3 => "π".to_string(),
        4 => format!("{}e{}", 1 + rng.pick(9), rng.pick(30)),
        _ => format!("{}", rng.pick(1000)),
    }
}

fn gen_expr(rng: &mut Rng, profondeur: u32) -> String {
    if profondeur == 0 {
        return gen_nombre(rng);
    }

    match rng.pick(8) {
        0 => gen_nombre(rng),
        1 => format!(
            "{} + {}",
            gen_expr(rng, profondeur - 1),
            gen_expr(rng, profondeur - 1)
        ),
        2 => format!(
            "{} - {}",
            gen_expr(rng, profondeur - 1),
            gen_expr(rng, profondeur - 1)
        ),
        3 => format!(
            "{} × {}",
            gen_expr(rng, profondeur - 1),
            gen_expr(rng, profondeur - 1)
        ),
        4 => format!(
            "({}) ÷ ({})",
            gen_expr(rng, profondeur - 1),
            gen_expr(rng, profondeur - 1)
        ),
        5 => {
            let f = ["sin", "cos", "tan", "sqrt", "log", "ln"][rng.pick(6) as usize];
            format!("{f}({})", gen_expr(rng, profondeur - 1))
        }
        6 => format!("({})^{}", gen_expr(rng, profondeur - 1), rng.pick(4)),
        _ => {
            // juxtaposition : 2(…) ou (…)(…)
            if rng.coin() {
                format!("{}({})", rng.pick(10), gen_expr(rng, profondeur - 1))
            } else {
                format!(
                    "({})({})",
                    gen_expr(rng, profondeur - 1),
                    gen_expr(rng, profondeur - 1)
                )
            }
        }
    }
}

/* ------------------------ Campagnes ------------------------ */

#[test]
fn fuzz_pipeline_invariants() {
    let t0 = Instant::now();
    let mut rng = Rng::new(0x5eed_cafe);

    for _ in 0..2_000 {
        budget(t0, Duration::from_secs(5));
        let expr = gen_expr(&mut rng, 4);

        match eval_expression(&expr) {
            Ok(v) => {
                check_invariant_valeur(&expr, v);
                check_aller_retour(&expr, v);
            }
            Err(e) => assert!(is_erreur_attendue(&e), "expr={expr:?} err={e}"),
        }
    }
}

#[test]
fn fuzz_determinisme() {
    let mut a = Rng::new(42);
    let mut b = Rng::new(42);
    for _ in 0..200 {
        let ea = gen_expr(&mut a, 3);
        let eb = gen_expr(&mut b, 3);
        assert_eq!(ea, eb);
        assert_eq!(eval_expression(&ea), eval_expression(&eb));
    }
}

#[test]
fn fuzz_octets_arbitraires_sans_panique() {
    let t0 = Instant::now();
    let mut rng = Rng::new(7);
    let alphabet: Vec<char> = "0123456789.+-*/^()π×÷√ sincotaqrlgpe#".chars().collect();

    for _ in 0..3_000 {
        budget(t0, Duration::from_secs(5));
        let n = rng.pick(24) as usize;
        let expr: String = (0..n)
            .map(|_| alphabet[rng.pick(alphabet.len() as u32) as usize])
            .collect();

        // seul contrat : pas de panique, et un Ok reste fini
        if let Ok(v) = eval_expression(&expr) {
            check_invariant_valeur(&expr, v);
        }
    }
}

#[test]
fn fuzz_touches_calculatrice() {
    let t0 = Instant::now();
    let mut rng = Rng::new(2024);
    let touches = [
        "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", ".", "+", "-", "×", "÷", "^", "(", ")",
        "π", "√", "sin", "cos", "tan", "log", "ln", "=", "DEL", "C",
    ];

    let mut c = Calculatrice::default();
    for _ in 0..5_000 {
        budget(t0, Duration::from_secs(5));
        let t = touches[rng.pick(touches.len() as u32) as usize];
        match t {
            "=" => c.calcule(),
            "DEL" => c.supprime(),
            "C" => c.efface(),
            t if t.len() == 1 && (t.as_bytes()[0].is_ascii_digit() || t == ".") => {
                c.ajoute_chiffre(t)
            }
            t => c.ajoute_operateur(t),
        }

        // invariant d’affichage : nombre relisible ou jeton d’erreur
        let r = &c.dernier_resultat;
        if r != JETON_ERREUR {
            let relu = parse_nombre_formate(r);
            assert!(
                relu.parse::<f64>().is_ok(),
                "résultat illisible: {r:?} (relu {relu:?})"
            );
        }
    }
}
