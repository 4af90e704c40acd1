//! Tests scientifiques (campagne) : lois du noyau + limites contrôlées.
//!
//! But : vérifier les propriétés annoncées sans faire chauffer la machine.
//! - budget temps global
//! - tailles bornées
//!
//! Notes importantes (aligné avec l’état actuel du noyau) :
//! - Règle degrés/radians : heuristique syntaxique. Un argument trig qui contient π
//!   est pris en radians EN ENTIER (sin(π + 10) => radians).
//! - Aller-retour d’affichage : la mantisse est coupée à 8 décimales,
//!   donc on compare en erreur relative (1e-8), pas bit à bit.

use std::time::{Duration, Instant};

use super::eval::SEUIL_ZERO;
use super::eval_expression;
use super::format::{format_nombre, parse_nombre_formate};
use super::normalise::normalise;

fn eval_ok(expr: &str) -> f64 {
    eval_expression(expr).unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
}

fn assert_proche(expr: &str, attendu: f64) {
    let v = eval_ok(expr);
    assert!(
        (v - attendu).abs() < 1e-9,
        "expr={expr:?} obtenu={v} attendu={attendu}"
    );
}

/// Budget global anti-gel (scientifique + safe).
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Degrés / radians ------------------------ */

#[test]
fn sci_sinus_degres_et_radians() {
    assert_proche("sin(30)", 0.5);
    assert_proche("sin(π/6)", 0.5);
    assert_proche("cos(60)", 0.5);
    assert_proche("cos(π/3)", 0.5);
    assert_proche("tan(45)", 1.0);
    assert_proche("tan(π/4)", 1.0);
}

#[test]
fn sci_heuristique_pi_conservee() {
    // tout l’argument passe en radians dès qu’il contient π
    assert_proche("sin(π+10)", (std::f64::consts::PI + 10.0).sin());
}

#[test]
fn sci_zeros_numeriques() {
    // identités trig : résidus flottants ramenés à 0
    assert_eq!(eval_ok("sin(180)"), 0.0);
    assert_eq!(eval_ok("cos(90)"), 0.0);
    assert_eq!(eval_ok("sin(π)"), 0.0);
    assert_eq!(eval_ok("0.1+0.2-0.3"), 0.0);
}

#[test]
fn sci_seuil_zero_sur_litteraux() {
    for a in ["9e-11", "-9e-11", "1e-15", "1e-300"] {
        assert_eq!(eval_ok(a), 0.0, "a={a}");
    }
    assert!(eval_ok("2e-10").abs() >= SEUIL_ZERO);
}

/* ------------------------ Multiplication implicite ------------------------ */

#[test]
fn sci_juxtaposition() {
    assert_eq!(normalise("2(3+4)"), "2*(3+4)");
    assert_eq!(eval_ok("2(3+4)"), 14.0);
    assert_eq!(eval_ok("(1+1)(2+2)"), 8.0);
    assert_proche("2π", 2.0 * std::f64::consts::PI);
}

#[test]
fn sci_logarithmes() {
    assert_proche("log(1000)", 3.0);
    assert_proche("ln(1)", 0.0);
    assert_proche("ln(π)", std::f64::consts::PI.ln());
}

/* ------------------------ Aller-retour affichage ------------------------ */

#[test]
fn sci_aller_retour_format() {
    let t0 = Instant::now();
    let valeurs = [
        14.0,
        -3.5,
        0.1 + 0.2,
        1e21,
        -1.5e25,
        6.02214076e23,
        1.602176634e-19,
        -9.109e-31,
        1.7976931348623157e308,
        5e-324,
        123456.789,
        2.5e-7,
    ];

    for x in valeurs {
        budget(t0, Duration::from_secs(2));
        let affiche = format_nombre(x);
        let relu = parse_nombre_formate(&affiche);
        let v = eval_ok(&relu);
        if x.abs() < SEUIL_ZERO {
            assert_eq!(v, 0.0, "x={x} affiché={affiche}");
        } else {
            let rel = ((v - x) / x).abs();
            assert!(rel < 1e-8, "x={x} affiché={affiche} relu={relu} v={v}");
        }
    }
}

#[test]
fn sci_affichage_relu_par_la_saisie_libre() {
    // un résultat formaté peut être recopié tel quel dans une expression
    assert_proche("1.5×10²⁵ / 1.5×10²⁵", 1.0);
    assert_proche("2×10⁻⁷ × 10^7", 2.0);
}

/* ------------------------ Stress contrôlé (sans brûler) ------------------------ */

#[test]
fn sci_stress_parentheses_imbriquees() {
    let t0 = Instant::now();
    for profondeur in [1usize, 8, 32, 128] {
        budget(t0, Duration::from_secs(2));
        let expr = format!("{}1{}", "(".repeat(profondeur), "+1)".repeat(profondeur));
        assert_eq!(eval_ok(&expr), (profondeur + 1) as f64);
    }
}

#[test]
fn sci_stress_trig_imbriquee() {
    let t0 = Instant::now();
    let mut expr = "0".to_string();
    for _ in 0..16 {
        budget(t0, Duration::from_secs(2));
        expr = format!("cos({expr})");
    }
    // cos(0°)=1, puis cos(1°), ... converge sans erreur
    assert!(eval_ok(&expr).is_finite());
}
