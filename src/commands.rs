use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use spades_map::{MapDims, VoxelGrid, color};
use spades_world::constants::STAND_HEIGHT;
use spades_world::{
    IVec3, Player, PlayerInput, Tool, Vec3, WeaponInput, WeaponKind, World, WorldConfig,
};

use crate::events::EventLog;
use crate::terrain::{self, TerrainParams};

pub fn info(path: &Path) -> Result<()> {
    let t0 = Instant::now();
    let grid = spades_vxl::read_file(path).with_context(|| format!("read map {}", path.display()))?;
    let dims = grid.dims();
    let mut surface = 0usize;
    let mut highest = dims.depth;
    for y in 0..dims.height {
        for x in 0..dims.width {
            let col = grid.solid_column(x, y);
            if col != 0 {
                highest = highest.min(col.trailing_zeros() as i32);
            }
            for z in 0..dims.depth {
                if grid.is_surface(x, y, z) {
                    surface += 1;
                }
            }
        }
    }
    println!(
        "{}: dims={} solid={} surface={} highest_z={}",
        path.display(),
        dims,
        grid.solid_count(),
        surface,
        highest
    );
    log::info!(target: "perf", "ms={} info dims={}", t0.elapsed().as_millis(), dims);
    Ok(())
}

pub fn generate(seed: i32, out: &Path, blank: bool) -> Result<()> {
    let dims = MapDims::STANDARD;
    let grid = if blank {
        VoxelGrid::new(dims)
    } else {
        terrain::generate(&TerrainParams::new(seed, dims))
    };
    spades_vxl::write_file(&grid, out).with_context(|| format!("write map {}", out.display()))?;
    println!("wrote {} ({} solid voxels)", out.display(), grid.solid_count());
    Ok(())
}

pub fn roundtrip(path: &Path) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("read map {}", path.display()))?;
    let first = spades_vxl::decode(&bytes)?;
    let encoded = spades_vxl::encode(&first);
    let second = spades_vxl::decode(&encoded).context("decode re-encoded map")?;

    let dims = first.dims();
    let mut solid_diff = 0usize;
    let mut color_diff = 0usize;
    for y in 0..dims.height {
        for x in 0..dims.width {
            let changed = first.solid_column(x, y) ^ second.solid_column(x, y);
            if changed != 0 {
                solid_diff += changed.count_ones() as usize;
                continue;
            }
            for z in 0..dims.depth {
                if first.is_surface(x, y, z)
                    && color::to_hex(first.color(x, y, z)) != color::to_hex(second.color(x, y, z))
                {
                    color_diff += 1;
                }
            }
        }
    }
    println!(
        "{}: {} -> {} bytes, identical={} solid_diff={} color_diff={}",
        path.display(),
        bytes.len(),
        encoded.len(),
        bytes == encoded,
        solid_diff,
        color_diff
    );
    if solid_diff != 0 || color_diff != 0 {
        bail!("round trip changed {solid_diff} voxels and {color_diff} surface colors");
    }
    Ok(())
}

pub fn ray(path: &Path, from: Vec3, dir: Vec3, steps: u32, fast: bool) -> Result<()> {
    let grid = spades_vxl::read_file(path).with_context(|| format!("read map {}", path.display()))?;
    if fast {
        match grid.cast_ray(from, dir, steps as f32) {
            Some(b) => println!("hit block=({}, {}, {})", b.x, b.y, b.z),
            None => println!("miss"),
        }
        return Ok(());
    }
    let r = grid.cast_ray2(from, dir, steps);
    println!(
        "hit={} start_solid={} block=({}, {}, {}) pos=({:.3}, {:.3}, {:.3}) normal=({}, {}, {})",
        r.hit,
        r.start_solid,
        r.hit_block.x,
        r.hit_block.y,
        r.hit_block.z,
        r.hit_pos.x,
        r.hit_pos.y,
        r.hit_pos.z,
        r.normal.x,
        r.normal.y,
        r.normal.z
    );
    Ok(())
}

fn load_map(path: &Path) -> Result<VoxelGrid> {
    let bytes = fs::read(path).with_context(|| format!("read map {}", path.display()))?;
    let job = spades_vxl::spawn_decode(bytes, MapDims::STANDARD);
    for p in job.progress().iter() {
        if p.rows_done % 128 == 0 {
            log::info!("loading {}: {:.0}%", path.display(), p.fraction() * 100.0);
        }
    }
    Ok(job.join()?)
}

const BOTS: usize = 6;
const WEAPONS: [WeaponKind; 3] = [WeaponKind::Rifle, WeaponKind::Smg, WeaponKind::Shotgun];

// Topmost solid z of a column, or the depth for an empty one.
fn surface_z(map: &VoxelGrid, x: i32, y: i32) -> i32 {
    match map.solid_column(x, y) {
        0 => map.depth(),
        col => col.trailing_zeros() as i32,
    }
}

fn spawn_point(map: &VoxelGrid, x: i32, y: i32) -> Vec3 {
    let top = surface_z(map, x, y);
    Vec3::new(x as f32 + 0.5, y as f32 + 0.5, top as f32 - STAND_HEIGHT - 0.1)
}

// Scripted inputs: walk in bursts, hop now and then, aim at the next bot and
// tap the trigger.
fn drive(world: &mut World, slot: usize, bots: usize, tick: u32) -> Result<()> {
    let target = world.player((slot + 1) % bots)?.map(|p| p.eye());
    let now = world.time();
    if let Some(p) = world.player_mut(slot)? {
        if let Some(t) = target {
            p.set_orientation(t - p.eye());
        }
        if p.tool() == Tool::Weapon && p.weapon().ammo() == 0 {
            p.reload(now);
        }
    }
    let input = PlayerInput {
        move_forward: (tick + slot as u32 * 40) % 240 < 120,
        jump: (tick + slot as u32 * 15) % 90 == 0,
        sprint: slot % 2 == 0,
        ..Default::default()
    };
    world.set_player_input(slot, input)?;
    world.set_weapon_input(
        slot,
        WeaponInput {
            primary: tick % 30 < 2,
            secondary: slot % 3 == 0,
        },
    )?;
    Ok(())
}

pub fn simulate(map: Option<&Path>, config: Option<&Path>, ticks: u32, dt: f32) -> Result<()> {
    let config = match config {
        Some(p) => WorldConfig::load(p).with_context(|| format!("load config {}", p.display()))?,
        None => WorldConfig::default(),
    };
    let grid = match map {
        Some(p) => load_map(p)?,
        None => terrain::generate(&TerrainParams::new(config.rng_seed as i32, MapDims::STANDARD)),
    };

    let events = EventLog::default();
    let mut world = World::new(grid, config);
    world.set_listener(Some(Box::new(events.clone())));

    let bots = BOTS.min(world.max_players());
    let center = world.map().width() / 2;
    for slot in 0..bots {
        let x = center - 30 + slot as i32 * 12;
        let pos = spawn_point(world.map(), x, center);
        let player = Player::new(slot, (slot % 2) as u8, WEAPONS[slot % WEAPONS.len()], pos);
        world.set_player(slot, player)?;
    }
    world.set_local_player(Some(0))?;
    if let Some(p) = world.player_mut(0)? {
        p.set_tool(Tool::Spade);
    }

    // a small tower that gets cut mid-run
    let tower = IVec3::new(center, center + 20, 0);
    let base = surface_z(world.map(), tower.x, tower.y);

    let t0 = Instant::now();
    for tick in 0..ticks {
        if tick == ticks / 4 {
            let stone = color::from_hex(0x808080);
            for dz in 1..=4 {
                world.create_block(IVec3::new(tower.x, tower.y, base - dz), stone);
            }
        }
        if tick == ticks / 2 {
            world.destroy_blocks(&[IVec3::new(tower.x, tower.y, base - 1)]);
        }
        for slot in 0..bots {
            drive(&mut world, slot, bots, tick)?;
        }
        world.advance(dt);
        world.update_smooth(dt);
    }
    log::info!(
        target: "perf",
        "ms={} simulate ticks={} bots={}",
        t0.elapsed().as_millis(),
        ticks,
        bots
    );

    println!("simulated {:.2}s with {} players", world.time(), bots);
    for (name, count) in events.summary() {
        println!("  {name:<18} {count}");
    }
    for (slot, p) in world.players() {
        println!(
            "  player {slot}: pos=({:.2}, {:.2}, {:.2}) ammo={} airborne={}",
            p.position.x,
            p.position.y,
            p.position.z,
            p.weapon().ammo(),
            p.is_airborne()
        );
    }
    Ok(())
}
