//! TAB/BIN backed resource collections

use std::ops::Range;
use std::sync::Arc;

use crate::anim::{AmapTable, Anim, ModanimTable, parse_anim};
use crate::config::GameInfo;
use crate::error::{Error, Result};
use crate::formats::container::decode_container;
use crate::formats::table::{OffsetTable, OffsetWidth};

use super::cache::{CacheStats, IdCache};
use super::fetcher::DataFetcher;

/// High byte of an `ANIM.TAB` value for a present entry.
const ANIM_PRESENT: u32 = 0x10;
const ANIM_OFFSET_MASK: u32 = 0x0fff_ffff;
const MODEL_OFFSET_MASK: u32 = 0x00ff_ffff;
/// Model data starts this far past its `MODELS.tab` offset.
const MODEL_DATA_OFFSET: usize = 0x24;

/// A TAB/BIN pair with its BIN kept in memory.
#[derive(Debug, Clone)]
struct TabBin {
    tab: OffsetTable,
    bin: Vec<u8>,
}

impl TabBin {
    fn fetch<F: DataFetcher + ?Sized>(
        fetcher: &F,
        name: &'static str,
        tab_path: &str,
        bin_path: &str,
        width: OffsetWidth,
    ) -> Result<Self> {
        let tab_data = fetcher.fetch_data(tab_path)?;
        let bin = fetcher.fetch_data(bin_path)?;
        let tab = OffsetTable::parse(name, &tab_data, width)?;
        tracing::debug!("Loaded {name}: {} entries, {} bytes of data", tab.len(), bin.len());
        Ok(Self { tab, bin })
    }

    fn slice(&self, range: Range<usize>) -> Result<&[u8]> {
        self.tab.slice(&self.bin, range)
    }
}

/// Animations of one map subdirectory (`ANIM.TAB`/`ANIM.BIN`).
#[derive(Debug)]
pub struct AnimCollection {
    tables: TabBin,
    cache: IdCache<Anim>,
}

impl AnimCollection {
    /// Fetch `ANIM.TAB` and `ANIM.BIN` for one map subdirectory.
    ///
    /// # Arguments
    /// * `fetcher` - Source of raw game files
    /// * `game` - Path layout of the game release
    /// * `subdir` - Map subdirectory name, e.g. `swaphol`
    ///
    /// # Returns
    /// An empty-cache collection, or the first fetch or table parse error.
    pub fn create<F: DataFetcher + ?Sized>(fetcher: &F, game: &GameInfo, subdir: &str) -> Result<Self> {
        let tables = TabBin::fetch(
            fetcher,
            "ANIM.TAB",
            &game.subdir_path(subdir, "ANIM.TAB"),
            &game.subdir_path(subdir, "ANIM.BIN"),
            OffsetWidth::U32,
        )?;
        Ok(Self {
            tables,
            cache: IdCache::new("anim"),
        })
    }

    /// Number of `ANIM.TAB` slots, present or not.
    pub fn len(&self) -> usize {
        self.tables.tab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.tab.is_empty()
    }

    pub fn has_anim(&self, id: u32) -> bool {
        self.tables
            .tab
            .get(id as usize)
            .is_some_and(|value| value >> 24 == ANIM_PRESENT)
    }

    /// Entry `id` runs to the next present entry, or to the end of the BIN.
    fn entry_range(&self, id: u32) -> Range<usize> {
        let tab = &self.tables.tab;
        let start = tab.get(id as usize).map_or(0, |v| v & ANIM_OFFSET_MASK) as usize;
        let end = (id as usize + 1..tab.len())
            .filter_map(|i| tab.get(i))
            .find(|value| value >> 24 == ANIM_PRESENT)
            .map_or(self.tables.bin.len(), |value| (value & ANIM_OFFSET_MASK) as usize);
        start..end
    }

    /// Parse (once) and return animation `id`.
    ///
    /// # Errors
    /// [`Error::ResourceNotFound`] if the slot is absent, parse errors on the
    /// first failed load and [`Error::ResourceAbsent`] after that.
    pub fn get_anim(&self, id: u32) -> Result<Arc<Anim>> {
        self.cache.get_or_load(id, || {
            if !self.has_anim(id) {
                return Err(Error::ResourceNotFound { kind: "anim", id });
            }
            let data = self.tables.slice(self.entry_range(id))?;
            let anim = parse_anim(data)?;
            tracing::debug!(
                "Loaded anim #{id}: {} keyframes, {} joints",
                anim.len(),
                anim.joint_count()
            );
            Ok(anim)
        })
    }

    /// Like [`Self::get_anim`], but logs failures and returns `None`.
    pub fn anim_or_absent(&self, id: u32) -> Option<Arc<Anim>> {
        self.get_anim(id)
            .inspect_err(|e| tracing::warn!("Failed to load animation {id}: {e}"))
            .ok()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// Joint remap tables for every model (`AMAP.TAB`/`AMAP.BIN` at the game root).
#[derive(Debug)]
pub struct AmapCollection {
    tables: TabBin,
    cache: IdCache<AmapTable>,
}

impl AmapCollection {
    /// Fetch `AMAP.TAB` and `AMAP.BIN` from the game root.
    ///
    /// # Arguments
    /// * `fetcher` - Source of raw game files
    /// * `game` - Path layout of the game release
    ///
    /// # Returns
    /// An empty-cache collection, or the first fetch or table parse error.
    pub fn create<F: DataFetcher + ?Sized>(fetcher: &F, game: &GameInfo) -> Result<Self> {
        let tables = TabBin::fetch(
            fetcher,
            "AMAP.TAB",
            &game.root_path("AMAP.TAB"),
            &game.root_path("AMAP.BIN"),
            OffsetWidth::U32,
        )?;
        Ok(Self {
            tables,
            cache: IdCache::new("amap"),
        })
    }

    /// Remap table for `model`.
    pub fn get_amap(&self, model: u32) -> Result<Arc<AmapTable>> {
        self.cache.get_or_load(model, || {
            let range = self
                .tables
                .tab
                .span(model as usize, u32::MAX)
                .ok_or(Error::ResourceNotFound { kind: "amap", id: model })?;
            Ok(AmapTable::new(self.tables.slice(range)?.to_vec()))
        })
    }

    pub fn amap_or_absent(&self, model: u32) -> Option<Arc<AmapTable>> {
        self.get_amap(model)
            .inspect_err(|e| tracing::warn!("Failed to load amap for model {model}: {e}"))
            .ok()
    }
}

/// Per-model animation lists (`MODANIM.TAB`/`MODANIM.BIN` at the game root).
#[derive(Debug)]
pub struct ModanimCollection {
    tables: TabBin,
    cache: IdCache<ModanimTable>,
}

impl ModanimCollection {
    /// Fetch `MODANIM.TAB` and `MODANIM.BIN` from the game root.
    ///
    /// # Arguments
    /// * `fetcher` - Source of raw game files
    /// * `game` - Path layout of the game release
    ///
    /// # Returns
    /// An empty-cache collection, or the first fetch or table parse error.
    pub fn create<F: DataFetcher + ?Sized>(fetcher: &F, game: &GameInfo) -> Result<Self> {
        let tables = TabBin::fetch(
            fetcher,
            "MODANIM.TAB",
            &game.root_path("MODANIM.TAB"),
            &game.root_path("MODANIM.BIN"),
            OffsetWidth::U16,
        )?;
        Ok(Self {
            tables,
            cache: IdCache::new("modanim"),
        })
    }

    pub fn get_modanim(&self, model: u32) -> Result<Arc<ModanimTable>> {
        self.cache.get_or_load(model, || {
            let range = self
                .tables
                .tab
                .span(model as usize, u32::MAX)
                .ok_or(Error::ResourceNotFound { kind: "modanim", id: model })?;
            Ok(ModanimTable::parse(self.tables.slice(range)?))
        })
    }
}

/// Models of one map subdirectory (`MODELS.tab`/`MODELS.bin`).
#[derive(Debug)]
pub struct ModelCollection {
    tables: TabBin,
    cache: IdCache<Vec<u8>>,
}

impl ModelCollection {
    /// Fetch `MODELS.tab` and `MODELS.bin` for one map subdirectory.
    ///
    /// # Arguments
    /// * `fetcher` - Source of raw game files
    /// * `game` - Path layout of the game release
    /// * `subdir` - Map subdirectory name
    ///
    /// # Returns
    /// An empty-cache collection, or the first fetch or table parse error.
    pub fn create<F: DataFetcher + ?Sized>(fetcher: &F, game: &GameInfo, subdir: &str) -> Result<Self> {
        let tables = TabBin::fetch(
            fetcher,
            "MODELS.tab",
            &game.subdir_path(subdir, "MODELS.tab"),
            &game.subdir_path(subdir, "MODELS.bin"),
            OffsetWidth::U32,
        )?;
        Ok(Self {
            tables,
            cache: IdCache::new("model"),
        })
    }

    /// Number of `MODELS.tab` slots, present or not.
    pub fn len(&self) -> usize {
        self.tables.tab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.tab.is_empty()
    }

    pub fn has_model(&self, model: u32) -> bool {
        self.tables.tab.get(model as usize).is_some_and(|v| v != 0)
    }

    /// Decoded data of `model`.
    pub fn model_data(&self, model: u32) -> Result<Arc<Vec<u8>>> {
        self.cache.get_or_load(model, || {
            let value = self
                .tables
                .tab
                .get(model as usize)
                .filter(|&v| v != 0)
                .ok_or(Error::ResourceNotFound { kind: "model", id: model })?;
            let start = (value & MODEL_OFFSET_MASK) as usize + MODEL_DATA_OFFSET;
            let data = self.tables.slice(start..self.tables.bin.len())?;
            Ok(decode_container(data)?.into_owned())
        })
    }
}

/// Everything loaded for one map subdirectory.
#[derive(Debug)]
pub struct ResourceCollection {
    pub subdir: String,
    pub anims: AnimCollection,
    pub amaps: AmapCollection,
    pub modanims: ModanimCollection,
    pub models: ModelCollection,
}

impl ResourceCollection {
    /// Fetch every table for `subdir`.
    ///
    /// # Arguments
    /// * `fetcher` - Source of raw game files
    /// * `game` - Path layout of the game release
    /// * `subdir` - Map subdirectory holding `ANIM` and `MODELS` tables
    ///
    /// # Returns
    /// All four collections, or the first error. Nothing is decoded until
    /// an entry is requested.
    pub fn create<F: DataFetcher + ?Sized>(fetcher: &F, game: &GameInfo, subdir: &str) -> Result<Self> {
        tracing::info!("Loading resources for {}/{subdir}", game.path_base);
        Ok(Self {
            subdir: subdir.to_string(),
            anims: AnimCollection::create(fetcher, game, subdir)?,
            amaps: AmapCollection::create(fetcher, game)?,
            modanims: ModanimCollection::create(fetcher, game)?,
            models: ModelCollection::create(fetcher, game, subdir)?,
        })
    }

    /// Animation playing in model-local `slot` of `model`.
    pub fn model_anim(&self, model: u32, slot: usize) -> Result<Arc<Anim>> {
        let id = self.modanims.get_modanim(model)?.anim_id(slot)?;
        self.anims.get_anim(id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::anim::parser::tests::two_frame_translation_anim;
    use crate::formats::container::wrap_dir;

    #[derive(Default)]
    struct MapFetcher(HashMap<String, Vec<u8>>);

    impl MapFetcher {
        fn with(mut self, path: &str, data: Vec<u8>) -> Self {
            self.0.insert(path.to_string(), data);
            self
        }
    }

    impl DataFetcher for MapFetcher {
        fn fetch_data(&self, path: &str) -> Result<Vec<u8>> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, path.to_string()).into())
        }
    }

    fn be32(values: &[u32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_be_bytes()).collect()
    }

    fn be16(values: &[u16]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_be_bytes()).collect()
    }

    fn fixture() -> MapFetcher {
        let anim = two_frame_translation_anim();
        let anim_len = anim.len() as u32;
        let mut anim_bin = anim.clone();
        anim_bin.extend_from_slice(&[0xEE; 4]);

        let model = wrap_dir(&[0xCA, 0xFE, 0xBA, 0xBE]);
        let mut models_bin = vec![0u8; 8];
        models_bin.extend(std::iter::repeat_n(0u8, MODEL_DATA_OFFSET));
        models_bin.extend_from_slice(&model);

        MapFetcher::default()
            .with(
                "StarFoxAdventures/swaphol/ANIM.TAB",
                be32(&[0x1000_0000, 0x0000_0000, 0x1000_0000 | anim_len, 0x1000_0000 | (anim_len + 4)]),
            )
            .with("StarFoxAdventures/swaphol/ANIM.BIN", anim_bin)
            .with("StarFoxAdventures/AMAP.TAB", be32(&[0, 2, 5]))
            .with("StarFoxAdventures/AMAP.BIN", vec![0, 1, 2, 0xFF, 1])
            .with("StarFoxAdventures/MODANIM.TAB", be16(&[0, 4, 4]))
            .with("StarFoxAdventures/MODANIM.BIN", be16(&[3, 0]))
            .with("StarFoxAdventures/swaphol/MODELS.tab", be32(&[0, 0x8000_0008]))
            .with("StarFoxAdventures/swaphol/MODELS.bin", models_bin)
    }

    fn collection() -> ResourceCollection {
        ResourceCollection::create(&fixture(), &GameInfo::sfa(), "swaphol").unwrap()
    }

    #[test]
    fn test_anim_lookup() {
        let res = collection();
        assert!(res.anims.has_anim(0));
        assert!(!res.anims.has_anim(1));
        assert!(!res.anims.has_anim(99));

        let anim = res.anims.get_anim(0).unwrap();
        assert_eq!(anim.len(), 2);
        assert_eq!(anim.keyframes[1].poses[0].axes[0].translation, 10.0);
        assert!(Arc::ptr_eq(&anim, &res.anims.get_anim(0).unwrap()));
    }

    #[test]
    fn test_missing_anim_is_not_found_then_absent() {
        let res = collection();
        assert!(matches!(res.anims.get_anim(1), Err(Error::ResourceNotFound { kind: "anim", id: 1 })));
        assert!(matches!(res.anims.get_anim(1), Err(Error::ResourceAbsent { kind: "anim", id: 1 })));
        assert!(res.anims.anim_or_absent(1).is_none());
    }

    #[test]
    fn test_garbage_anim_entry_fails() {
        // entry 2 spans the four 0xEE bytes, too short for a header
        let res = collection();
        assert!(res.anims.anim_or_absent(2).is_none());
        assert_eq!(res.anims.cache_stats().absent, 1);
    }

    #[test]
    fn test_amap_and_modanim() {
        let res = collection();
        let amap = res.amaps.get_amap(1).unwrap();
        assert_eq!(amap.as_bytes(), &[2, 0xFF, 1]);
        assert_eq!(amap.dest_joint(1), None);
        assert!(res.amaps.amap_or_absent(2).is_none());

        let modanim = res.modanims.get_modanim(0).unwrap();
        assert_eq!(modanim.anim_ids(), &[3, 0]);
        let anim = res.model_anim(0, 1).unwrap();
        assert_eq!(anim.joint_count(), 1);
    }

    #[test]
    fn test_model_data() {
        let res = collection();
        assert!(!res.models.has_model(0));
        assert!(matches!(res.models.model_data(0), Err(Error::ResourceNotFound { .. })));
        assert_eq!(res.models.model_data(1).unwrap().as_slice(), &[0xCA, 0xFE, 0xBA, 0xBE]);
    }

    #[test]
    fn test_missing_file() {
        let fetcher = MapFetcher::default();
        let err = AmapCollection::create(&fetcher, &GameInfo::sfa()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
