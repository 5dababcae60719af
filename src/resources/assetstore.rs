//! Asset registry resolving integer ids to textures and texture regions.
//!
//! The store owns every registered asset through an [`Arc`]; consumers get
//! [`Weak`] references from [`AssetResolver::resolve`]. Removing an asset
//! therefore expires the references held by sprites without touching them.

use std::sync::{Arc, Weak};

use bevy_ecs::prelude::Resource;
use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::resources::imageloader::ImageLoader;
use crate::resources::texture::{Texture, TextureRegion};

/// Identifier handed out by the [`AssetStore`].
pub type AssetId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Texture,
    TextureRegion,
}

/// Asset owned by the store.
#[derive(Debug, Clone)]
pub enum Asset {
    Texture(Arc<Texture>),
    Region(Arc<TextureRegion>),
}

impl Asset {
    pub fn kind(&self) -> AssetKind {
        match self {
            Asset::Texture(_) => AssetKind::Texture,
            Asset::Region(_) => AssetKind::TextureRegion,
        }
    }
}

/// Result of looking an id up. Never keeps the asset alive.
#[derive(Debug, Clone)]
pub enum ResolvedAsset {
    Texture(Weak<Texture>),
    Region(Weak<TextureRegion>),
    NotFound,
}

impl ResolvedAsset {
    pub fn kind(&self) -> Option<AssetKind> {
        match self {
            ResolvedAsset::Texture(_) => Some(AssetKind::Texture),
            ResolvedAsset::Region(_) => Some(AssetKind::TextureRegion),
            ResolvedAsset::NotFound => None,
        }
    }
}

/// Resolves asset ids for sprite construction.
pub trait AssetResolver {
    fn resolve(&self, id: AssetId) -> ResolvedAsset;

    fn is_asset_a(&self, id: AssetId, kind: AssetKind) -> bool {
        self.resolve(id).kind() == Some(kind)
    }
}

/// Registry of loaded textures and regions keyed by [`AssetId`].
#[derive(Resource, Debug, Default)]
pub struct AssetStore {
    next_id: AssetId,
    assets: FxHashMap<AssetId, Asset>,
    names: FxHashMap<String, AssetId>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, name: Option<&str>, asset: Asset) -> AssetId {
        self.next_id += 1;
        let id = self.next_id;
        debug!("asset {} registered as {:?} ({:?})", id, asset.kind(), name);
        self.assets.insert(id, asset);
        if let Some(name) = name {
            if let Some(previous) = self.names.insert(name.to_string(), id) {
                warn!("asset name '{}' rebound from id {} to {}", name, previous, id);
            }
        }
        id
    }

    /// Register a texture. `name` makes it findable through [`id_of`](Self::id_of).
    pub fn add_texture(&mut self, name: Option<&str>, texture: Arc<Texture>) -> AssetId {
        self.insert(name, Asset::Texture(texture))
    }

    pub fn add_region(&mut self, name: Option<&str>, region: TextureRegion) -> AssetId {
        self.insert(name, Asset::Region(Arc::new(region)))
    }

    pub fn id_of(&self, name: &str) -> Option<AssetId> {
        self.names.get(name).copied()
    }

    pub fn kind(&self, id: AssetId) -> Option<AssetKind> {
        self.assets.get(&id).map(Asset::kind)
    }

    /// Unregister an asset, dropping the store's ownership of it.
    pub fn remove(&mut self, id: AssetId) -> Option<Asset> {
        self.names.retain(|_, v| *v != id);
        self.assets.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn textures(&self) -> impl Iterator<Item = &Arc<Texture>> {
        self.assets.values().filter_map(|asset| match asset {
            Asset::Texture(texture) => Some(texture),
            Asset::Region(_) => None,
        })
    }

    /// Rebuild every registered texture after a context loss.
    ///
    /// Handles that no longer name a GPU object are forgotten first, before
    /// any texture is recreated, so no recycled name is ever deleted. Returns
    /// the number of textures that failed to reload.
    ///
    /// A texture whose handle was forgotten and whose reload then fails is
    /// left without a handle (`handle() == None`), not with its dead name.
    pub fn reload_textures(&self, loader: &ImageLoader) -> usize {
        for texture in self.textures() {
            if !texture.is_valid() {
                texture.forget_handle();
            }
        }
        let mut failures = 0;
        for texture in self.textures() {
            if texture.reload(loader).is_err() {
                failures += 1;
            }
        }
        failures
    }
}

impl AssetResolver for AssetStore {
    fn resolve(&self, id: AssetId) -> ResolvedAsset {
        match self.assets.get(&id) {
            Some(Asset::Texture(texture)) => ResolvedAsset::Texture(Arc::downgrade(texture)),
            Some(Asset::Region(region)) => ResolvedAsset::Region(Arc::downgrade(region)),
            None => ResolvedAsset::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::gpu::GpuBackend;
    use crate::backend::headless::HeadlessGpu;
    use crate::resources::imageloader::Image;
    use crate::resources::texture::UvRect;

    fn texture() -> Arc<Texture> {
        let gpu: Arc<dyn GpuBackend> = Arc::new(HeadlessGpu::new());
        Arc::new(Texture::new(gpu, &Image::filled(2, 2, [255; 4])))
    }

    #[test]
    fn ids_resolve_to_their_kind() {
        let mut store = AssetStore::new();
        let tex = texture();
        let t = store.add_texture(Some("hero"), tex.clone());
        let r = store.add_region(None, TextureRegion::new(&tex, UvRect::FULL));

        assert!(store.is_asset_a(t, AssetKind::Texture));
        assert!(store.is_asset_a(r, AssetKind::TextureRegion));
        assert!(!store.is_asset_a(r, AssetKind::Texture));
        assert!(matches!(store.resolve(999), ResolvedAsset::NotFound));
        assert_eq!(store.id_of("hero"), Some(t));
    }

    #[test]
    fn remove_expires_weak_references() {
        let mut store = AssetStore::new();
        let id = store.add_texture(Some("tmp"), texture());
        let ResolvedAsset::Texture(weak) = store.resolve(id) else {
            panic!("expected a texture");
        };
        assert!(weak.upgrade().is_some());

        store.remove(id);
        assert!(weak.upgrade().is_none());
        assert_eq!(store.id_of("tmp"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn textures_skips_regions() {
        let mut store = AssetStore::new();
        let tex = texture();
        store.add_texture(None, tex.clone());
        store.add_region(None, TextureRegion::new(&tex, UvRect::FULL));
        assert_eq!(store.len(), 2);
        assert_eq!(store.textures().count(), 1);
    }
}
