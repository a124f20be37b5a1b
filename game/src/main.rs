//! Headless bouncing-spheres demo
//!
//! Builds a ground box and a few spheres, then runs a fixed number of frames
//! and logs where the spheres end up. An optional first argument names a
//! JSON engine config file.

use scene_engine::prelude::*;
use tracing::{info, warn};

const FRAMES: u32 = 600;
const FRAME_DELTA: f32 = 1.0 / 60.0;

fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    scene_engine::init_logging_with_default(config.log_filter.as_deref().unwrap_or("info"));
    info!("Starting bouncing spheres demo");

    let mut engine = Engine::with_config(config);
    create_demo_scene(&mut engine)?;

    for _ in 0..FRAMES {
        let report = engine.frame(FRAME_DELTA);
        for failure in &report.start_failures {
            warn!(owner = %failure.owner, kind = failure.kind, "Entity failed to start");
        }
        if report.frame % 60 == 0 {
            log_positions(&engine, report.frame);
        }
    }

    log_positions(&engine, engine.frame_count());
    info!("Demo finished");
    Ok(())
}

/// Ground plane, a lamp and three spheres of varying bounciness
fn create_demo_scene(engine: &mut Engine) -> Result<()> {
    let ground = EntityId::new();
    engine.add(Transform::new(ground));
    engine.add(Body::new(ground, 1.0)?.static_body());
    engine.add(Collider::from_box_size(ground, Vec3::new(20.0, 1.0, 20.0))?);
    engine.add(Render::new(ground, vec![MeshId(0)]));

    let lamp = EntityId::new();
    engine.add(Transform::from_position(lamp, Vec3::new(0.0, 8.0, 0.0)));
    engine.add(PointLight::new(lamp, LightData::default()));

    for (i, bounciness) in [1.0, 0.8, 0.5].into_iter().enumerate() {
        let sphere = EntityId::new();
        let x = i as f32 * 2.0 - 2.0;
        engine.add(Transform::from_position(sphere, Vec3::new(x, 4.0 + i as f32, 0.0)));
        engine.add(Body::new(sphere, 1.0)?.with_bounciness(bounciness)?);
        engine.add(Collider::sphere(sphere, 0.5)?);
        engine.add(Render::new(sphere, vec![MeshId(1)]));
    }

    Ok(())
}

fn log_positions(engine: &Engine, frame: u64) {
    for body in engine.physics.bodies() {
        let body = body.borrow();
        if body.is_static() {
            continue;
        }
        if let Some(position) = body.position() {
            info!(
                frame,
                owner = %body.owner,
                x = position.x,
                y = position.y,
                z = position.z,
                vy = body.velocity.y,
                "Sphere position"
            );
        }
    }
}
