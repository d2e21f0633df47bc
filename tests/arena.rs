// Additional integration tests for arena / tuning invariants.
// These tests are native-friendly and avoid wasm/browser APIs.

use squirrel_finder::game::sim::{
    ARENA_H, ARENA_W, KOALA_STEP, Lcg, MAX_PLAYERS, Mover, Rect, SPAWN_MARGIN, SPRITE_SIZE,
    SQUIRREL_SPAWN_MS, SQUIRREL_SPEED, STRAWBERRY_SPAWN_MS, STRAWBERRY_SPEED,
};

#[test]
fn tuning_constants_are_coherent() {
    // Sprites must fit the arena with room to move.
    assert!(SPRITE_SIZE * 2.0 < ARENA_W.min(ARENA_H));
    // Spawn margin keeps a whole sprite half inside from every edge.
    assert!(SPAWN_MARGIN >= SPRITE_SIZE / 2.0);
    assert!(SPAWN_MARGIN * 2.0 < ARENA_W.min(ARENA_H));
    // The hazard shows up before the target, and both after the round starts.
    assert!(STRAWBERRY_SPAWN_MS > 0.0);
    assert!(STRAWBERRY_SPAWN_MS < SQUIRREL_SPAWN_MS);
    // The hazard outruns the target; the player outruns both.
    assert!(SQUIRREL_SPEED < STRAWBERRY_SPEED);
    assert!(STRAWBERRY_SPEED < KOALA_STEP);
    assert!(MAX_PLAYERS >= 1);
}

#[test]
fn clamp_covers_every_corner() {
    for (x, y) in [
        (-100.0, -100.0),
        (ARENA_W + 5.0, -3.0),
        (-3.0, ARENA_H + 5.0),
        (ARENA_W * 2.0, ARENA_H * 2.0),
    ] {
        let mut r = Rect {
            x,
            y,
            w: SPRITE_SIZE,
            h: SPRITE_SIZE,
        };
        r.clamp_to_arena();
        assert!(r.in_arena(), "clamp failed from ({x}, {y}): {r:?}");
    }
}

// Long soak: random starting points, both speeds, thousands of reflections;
// the bouncer must stay inside and keep the same per-axis speed magnitude.
#[test]
fn bouncers_soak_without_overshoot_compounding() {
    let mut rng = Lcg::new(2024);
    for speed in [STRAWBERRY_SPEED, SQUIRREL_SPEED] {
        for _ in 0..10 {
            let cx = rng.pick_int(SPAWN_MARGIN as i64, (ARENA_W - SPAWN_MARGIN) as i64) as f64;
            let cy = rng.pick_int(SPAWN_MARGIN as i64, (ARENA_H - SPAWN_MARGIN) as i64) as f64;
            let mut m = Mover {
                rect: Rect::from_center(cx, cy, SPRITE_SIZE, SPRITE_SIZE),
                vx: rng.pick_sign(speed),
                vy: rng.pick_sign(speed),
            };
            for _ in 0..5000 {
                m.advance();
                assert!(m.rect.in_arena(), "escaped at {:?}", m.rect);
                assert_eq!(m.vx.abs(), speed);
                assert_eq!(m.vy.abs(), speed);
            }
        }
    }
}

#[test]
fn lcg_spread_hits_both_signs_and_the_whole_range() {
    let mut rng = Lcg::new(7);
    let (mut pos, mut neg) = (0, 0);
    let (mut lo_seen, mut hi_seen) = (i64::MAX, i64::MIN);
    for _ in 0..1000 {
        if rng.pick_sign(1.0) > 0.0 {
            pos += 1;
        } else {
            neg += 1;
        }
        let v = rng.pick_int(0, 9);
        lo_seen = lo_seen.min(v);
        hi_seen = hi_seen.max(v);
        assert!((0..=9).contains(&v));
    }
    assert!(pos > 0 && neg > 0, "sign picks collapsed: +{pos} -{neg}");
    assert_eq!((lo_seen, hi_seen), (0, 9));
}
