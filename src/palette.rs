use std::path::{Path, PathBuf};

use anyhow::Context;
use bevy::{camera::primitives::Aabb, gltf::GltfAssetLabel, prelude::*};
use rand::Rng;

pub struct PalettePlugin;

impl Plugin for PalettePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpawnPalette>()
            .add_systems(Update, refresh_palette_entries);
    }
}

// ---------------------------------------------------------------------------
// Palette entries
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub enum PaletteSource {
    Cuboid { half_extent: Vec3 },
    Sphere { radius: f32 },
    Gltf(PathBuf),
}

/// One placeable asset the spawn tool can instantiate.
#[derive(Clone, Debug)]
pub struct PaletteEntry {
    pub name: String,
    pub source: PaletteSource,
}

impl PaletteEntry {
    /// Local bounding half-extent at unit scale, when it is known without
    /// loading anything. GLTF extents are resolved from the spawned scene's
    /// `Aabb` once its meshes are ready.
    pub fn extent_hint(&self) -> Option<Vec3> {
        match self.source {
            PaletteSource::Cuboid { half_extent } => Some(half_extent),
            PaletteSource::Sphere { radius } => Some(Vec3::splat(radius)),
            PaletteSource::Gltf(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Palette resource
// ---------------------------------------------------------------------------

/// The set of placeable assets and the subset currently selected for
/// spawning. The surrounding asset-browser UI owns `selected`; the spawn tool
/// only reads it through [`SpawnPalette::pick`].
#[derive(Resource)]
pub struct SpawnPalette {
    pub entries: Vec<PaletteEntry>,
    /// Indices into `entries` the user has marked for spawning.
    pub selected: Vec<usize>,
    pub needs_refresh: bool,
    last_pick: Option<usize>,
}

impl Default for SpawnPalette {
    fn default() -> Self {
        let entries = vec![
            PaletteEntry {
                name: "Cube".into(),
                source: PaletteSource::Cuboid {
                    half_extent: Vec3::splat(0.5),
                },
            },
            PaletteEntry {
                name: "Sphere".into(),
                source: PaletteSource::Sphere { radius: 0.5 },
            },
        ];
        let selected = (0..entries.len()).collect();
        Self {
            entries,
            selected,
            needs_refresh: true,
            last_pick: None,
        }
    }
}

impl SpawnPalette {
    /// Pick the asset to spawn next: deterministic when exactly one candidate
    /// is selected, otherwise uniform random excluding the immediately
    /// previous pick so the same asset never repeats twice in a row.
    pub fn pick(&mut self) -> Option<PaletteEntry> {
        let candidates: Vec<usize> = self
            .selected
            .iter()
            .copied()
            .filter(|&i| i < self.entries.len())
            .collect();

        let index = match candidates.len() {
            0 => return None,
            1 => candidates[0],
            _ => {
                let pool: Vec<usize> = candidates
                    .iter()
                    .copied()
                    .filter(|&i| Some(i) != self.last_pick)
                    .collect();
                pool[rand::thread_rng().gen_range(0..pool.len())]
            }
        };

        self.last_pick = Some(index);
        Some(self.entries[index].clone())
    }
}

// ---------------------------------------------------------------------------
// Asset directory scan
// ---------------------------------------------------------------------------

fn refresh_palette_entries(mut palette: ResMut<SpawnPalette>) {
    if !palette.needs_refresh {
        return;
    }
    palette.needs_refresh = false;

    let assets_dir = std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("assets");
    if !assets_dir.is_dir() {
        return;
    }

    match scan_placeable_assets(&assets_dir) {
        Ok(found) => {
            for entry in found {
                let index = palette.entries.len();
                palette.entries.push(entry);
                palette.selected.push(index);
            }
        }
        Err(err) => warn!("Failed to scan placeable assets: {err:#}"),
    }
}

/// Collect spawnable model files (`.glb`/`.gltf`) from the assets directory,
/// keeping paths relative to it so they match Bevy's asset loading.
fn scan_placeable_assets(assets_dir: &Path) -> anyhow::Result<Vec<PaletteEntry>> {
    let mut found = Vec::new();
    let read_dir = std::fs::read_dir(assets_dir)
        .with_context(|| format!("reading {}", assets_dir.display()))?;

    for entry in read_dir {
        let entry = entry?;
        let path = entry.path();
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !matches!(ext, "glb" | "gltf") {
            continue;
        }
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Model".to_string());
        let relative = path.strip_prefix(assets_dir).unwrap_or(&path).to_path_buf();
        found.push(PaletteEntry {
            name,
            source: PaletteSource::Gltf(relative),
        });
    }

    found.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(found)
}

// ---------------------------------------------------------------------------
// Spawning and extent resolution
// ---------------------------------------------------------------------------

/// Instantiate a palette entry at the given transform and hand back its
/// entity. The caller owns follow-up markers (preview proxy vs. real object).
pub fn spawn_entry(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    asset_server: &AssetServer,
    entry: &PaletteEntry,
    transform: Transform,
) -> Entity {
    match &entry.source {
        PaletteSource::Cuboid { half_extent } => commands
            .spawn((
                Name::new(entry.name.clone()),
                Mesh3d(meshes.add(Cuboid::from_size(*half_extent * 2.0))),
                MeshMaterial3d(materials.add(Color::srgb(0.7, 0.7, 0.72))),
                transform,
                Visibility::default(),
            ))
            .id(),
        PaletteSource::Sphere { radius } => commands
            .spawn((
                Name::new(entry.name.clone()),
                Mesh3d(meshes.add(Sphere::new(*radius))),
                MeshMaterial3d(materials.add(Color::srgb(0.7, 0.7, 0.72))),
                transform,
                Visibility::default(),
            ))
            .id(),
        PaletteSource::Gltf(path) => commands
            .spawn((
                Name::new(entry.name.clone()),
                SceneRoot(asset_server.load(GltfAssetLabel::Scene(0).from_asset(path.clone()))),
                transform,
                Visibility::default(),
            ))
            .id(),
    }
}

/// Resolve an entity's local bounding half-extent at unit scale from its own
/// `Aabb` or the first one found on a descendant (GLTF scenes keep meshes on
/// child entities).
pub fn resolve_extent(
    entity: Entity,
    aabb_query: &Query<&Aabb>,
    children_query: &Query<&Children>,
) -> Option<Vec3> {
    if let Ok(aabb) = aabb_query.get(entity) {
        return Some(Vec3::from(aabb.half_extents));
    }
    let mut stack: Vec<Entity> = children_query
        .get(entity)
        .map(|children| children.iter().collect())
        .unwrap_or_default();
    while let Some(current) = stack.pop() {
        if let Ok(aabb) = aabb_query.get(current) {
            return Some(Vec3::from(aabb.half_extents));
        }
        if let Ok(children) = children_query.get(current) {
            stack.extend(children.iter());
        }
    }
    None
}
