//! Filesystem-backed clip catalog.
//!
//! Clips are plain `.mp4` files in one directory. Per-clip state the file
//! itself cannot hold (tags, liked flag) lives in a JSON sidecar keyed by
//! file name; entries are created on first sight with defaults.

use std::collections::BTreeMap;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tokio::fs;

use cr_core::clip::{ClipPath, ClipRecord, PageResult, Tag};
use cr_core::ports::ClipStorePort;

const SIDECAR_FILE_NAME: &str = "data.json";

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct SidecarEntry {
    #[serde(default)]
    tags: Vec<Tag>,
    #[serde(default)]
    liked: bool,
}

type Sidecar = BTreeMap<String, SidecarEntry>;

pub struct FsClipStore {
    clips_dir: PathBuf,
    sidecar_path: PathBuf,
}

impl FsClipStore {
    pub fn new(clips_dir: impl Into<PathBuf>, sidecar_path: impl Into<PathBuf>) -> Self {
        Self {
            clips_dir: clips_dir.into(),
            sidecar_path: sidecar_path.into(),
        }
    }

    /// Store rooted at the configured save path (relative to home) with the
    /// sidecar in the user's config directory.
    pub fn from_home(save_path_from_home: &str) -> Result<Self> {
        let home = dirs::home_dir().context("home directory not found")?;
        let config = dirs::config_dir().context("config directory not found")?;
        Ok(Self::new(
            home.join(save_path_from_home),
            config.join("cliprack").join(SIDECAR_FILE_NAME),
        ))
    }

    async fn read_sidecar(&self) -> Result<Sidecar> {
        match fs::read_to_string(&self.sidecar_path).await {
            Ok(content) => {
                // A corrupt sidecar degrades to empty rather than taking the
                // whole catalog down with it.
                Ok(serde_json::from_str(&content).unwrap_or_else(|err| {
                    log::warn!(
                        "unreadable sidecar {}: {err}",
                        self.sidecar_path.display()
                    );
                    Sidecar::new()
                }))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Sidecar::new()),
            Err(e) => Err(e).with_context(|| {
                format!("read sidecar failed: {}", self.sidecar_path.display())
            }),
        }
    }

    async fn write_sidecar(&self, sidecar: &Sidecar) -> Result<()> {
        if let Some(dir) = self.sidecar_path.parent() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create sidecar dir failed: {}", dir.display()))?;
        }
        let content = serde_json::to_string_pretty(sidecar).context("serialize sidecar")?;
        fs::write(&self.sidecar_path, content)
            .await
            .with_context(|| format!("write sidecar failed: {}", self.sidecar_path.display()))
    }

    async fn scan_clip_files(&self) -> Result<Vec<PathBuf>> {
        let mut dir = fs::read_dir(&self.clips_dir)
            .await
            .with_context(|| format!("read clips dir failed: {}", self.clips_dir.display()))?;
        let mut paths = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("mp4") {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(paths)
    }
}

/// Duration in seconds from the MP4 container header. Parsing runs on a
/// blocking thread; a file without a readable header reports 0.0.
async fn video_duration(path: &Path) -> Result<f64> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<f64> {
        let file = std::fs::File::open(&path)
            .with_context(|| format!("open for duration check failed: {}", path.display()))?;
        let size = file.metadata()?.len();
        let reader = BufReader::new(file);
        let mp4 = mp4::Mp4Reader::read_header(reader, size)
            .with_context(|| format!("read mp4 header failed: {}", path.display()))?;
        let duration = mp4.moov.mvhd.duration;
        let timescale = mp4.moov.mvhd.timescale;
        if timescale > 0 {
            Ok(duration as f64 / f64::from(timescale))
        } else {
            Ok(0.0)
        }
    })
    .await
    .context("duration task panicked")?
}

fn sidecar_key(name: &str) -> String {
    if name.ends_with(".mp4") {
        name.to_string()
    } else {
        format!("{name}.mp4")
    }
}

#[async_trait]
impl ClipStorePort for FsClipStore {
    async fn pull_clips(
        &self,
        page: usize,
        page_size: usize,
        search: Option<&str>,
    ) -> Result<PageResult> {
        if !self.clips_dir.exists() {
            return Ok(PageResult::empty());
        }

        let mut sidecar = self.read_sidecar().await?;
        let all_paths = self.scan_clip_files().await?;

        let filtered: Vec<PathBuf> = match search {
            Some(query) => {
                let query = query.to_lowercase();
                all_paths
                    .into_iter()
                    .filter(|path| {
                        path.file_stem()
                            .and_then(|s| s.to_str())
                            .unwrap_or("")
                            .to_lowercase()
                            .contains(&query)
                    })
                    .collect()
            }
            None => all_paths,
        };

        let total_clips = filtered.len();
        let total_pages = total_clips.div_ceil(page_size.max(1));
        let start = (page.max(1) - 1) * page_size;
        let page_paths = if start < total_clips {
            &filtered[start..(start + page_size).min(total_clips)]
        } else {
            &[]
        };

        let mut sidecar_dirty = false;
        let mut clips = Vec::with_capacity(page_paths.len());
        for path in page_paths {
            let file_name = path
                .file_name()
                .context("clip path has no file name")?
                .to_string_lossy()
                .into_owned();

            let entry = match sidecar.get(&file_name) {
                Some(entry) => entry.clone(),
                None => {
                    // First sight of this file; register it so tags and the
                    // liked flag have a place to live.
                    sidecar.insert(file_name.clone(), SidecarEntry::default());
                    sidecar_dirty = true;
                    SidecarEntry::default()
                }
            };

            let metadata = fs::metadata(path)
                .await
                .with_context(|| format!("read metadata failed: {file_name}"))?;
            if metadata.len() == 0 {
                // Most likely a recording still being written out.
                continue;
            }

            let length = video_duration(path).await.unwrap_or(0.0);
            let created_at: DateTime<Local> = metadata
                .created()
                .map(Into::into)
                .unwrap_or_else(|_| Local::now());
            let updated_at: DateTime<Local> = metadata
                .modified()
                .map(Into::into)
                .unwrap_or_else(|_| Local::now());

            clips.push(ClipRecord {
                name: file_name
                    .strip_suffix(".mp4")
                    .unwrap_or(&file_name)
                    .to_string(),
                path: ClipPath::from(path.to_string_lossy().into_owned()),
                length,
                size: metadata.len(),
                created_at,
                updated_at,
                tags: entry.tags,
                liked: entry.liked,
            });
        }

        if sidecar_dirty {
            self.write_sidecar(&sidecar).await?;
        }

        Ok(PageResult {
            clips,
            total_pages,
            total_clips,
        })
    }

    async fn delete_clip(&self, path: &ClipPath) -> Result<()> {
        fs::remove_file(path.as_str())
            .await
            .with_context(|| format!("delete clip failed: {path}"))
    }

    async fn rename_clip(&self, path: &ClipPath, new_name: &str) -> Result<()> {
        let old = Path::new(path.as_str());
        let old_file_name = old
            .file_name()
            .context("clip path has no file name")?
            .to_string_lossy()
            .into_owned();
        let new_file_name = sidecar_key(new_name);
        let new_path = old.with_file_name(&new_file_name);
        if new_path.exists() {
            bail!("a clip named {new_file_name} already exists");
        }

        fs::rename(old, &new_path)
            .await
            .with_context(|| format!("rename clip failed: {path} -> {new_file_name}"))?;

        // Migrate the sidecar entry to the new identity.
        let mut sidecar = self.read_sidecar().await?;
        if let Some(entry) = sidecar.remove(&old_file_name) {
            sidecar.insert(new_file_name, entry);
            self.write_sidecar(&sidecar).await?;
        }
        Ok(())
    }

    async fn like_clip(&self, name: &str, liked: bool) -> Result<()> {
        let mut sidecar = self.read_sidecar().await?;
        sidecar.entry(sidecar_key(name)).or_default().liked = liked;
        self.write_sidecar(&sidecar).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixture {
        _root: TempDir,
        store: FsClipStore,
        clips_dir: PathBuf,
    }

    fn fixture() -> Fixture {
        let root = TempDir::new().unwrap();
        let clips_dir = root.path().join("clips");
        std::fs::create_dir_all(&clips_dir).unwrap();
        let store = FsClipStore::new(&clips_dir, root.path().join("data.json"));
        Fixture {
            _root: root,
            store,
            clips_dir,
        }
    }

    fn add_clip(fx: &Fixture, name: &str) {
        // Not a valid MP4; duration parsing falls back to 0.0.
        std::fs::write(fx.clips_dir.join(name), b"not really mp4").unwrap();
    }

    #[tokio::test]
    async fn missing_directory_yields_an_empty_catalog() {
        let root = TempDir::new().unwrap();
        let store = FsClipStore::new(root.path().join("nope"), root.path().join("data.json"));
        let result = store.pull_clips(1, 16, None).await.unwrap();
        assert_eq!(result, PageResult::empty());
    }

    #[tokio::test]
    async fn pages_are_sliced_in_file_name_order() {
        let fx = fixture();
        for i in 0..5 {
            add_clip(&fx, &format!("clip-{i}.mp4"));
        }

        let first = fx.store.pull_clips(1, 2, None).await.unwrap();
        assert_eq!(first.total_clips, 5);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.clips[0].name, "clip-0");
        assert_eq!(first.clips[1].name, "clip-1");
        assert_eq!(first.clips[0].length, 0.0);

        let last = fx.store.pull_clips(3, 2, None).await.unwrap();
        assert_eq!(last.clips.len(), 1);
        assert_eq!(last.clips[0].name, "clip-4");

        // Past the end: empty page, same totals.
        let beyond = fx.store.pull_clips(9, 2, None).await.unwrap();
        assert!(beyond.clips.is_empty());
        assert_eq!(beyond.total_clips, 5);
    }

    #[tokio::test]
    async fn search_filters_on_the_stem_case_insensitively() {
        let fx = fixture();
        add_clip(&fx, "Boss-Fight.mp4");
        add_clip(&fx, "chill-run.mp4");

        let result = fx.store.pull_clips(1, 16, Some("boss")).await.unwrap();
        assert_eq!(result.total_clips, 1);
        assert_eq!(result.clips[0].name, "Boss-Fight");
    }

    #[tokio::test]
    async fn zero_byte_files_are_skipped_on_the_page() {
        let fx = fixture();
        add_clip(&fx, "done.mp4");
        std::fs::write(fx.clips_dir.join("recording.mp4"), b"").unwrap();

        let result = fx.store.pull_clips(1, 16, None).await.unwrap();
        assert_eq!(result.clips.len(), 1);
        assert_eq!(result.clips[0].name, "done");
    }

    #[tokio::test]
    async fn first_pull_registers_sidecar_entries() {
        let fx = fixture();
        add_clip(&fx, "a.mp4");

        fx.store.pull_clips(1, 16, None).await.unwrap();

        let sidecar = fx.store.read_sidecar().await.unwrap();
        assert!(sidecar.contains_key("a.mp4"));
        assert!(!sidecar["a.mp4"].liked);
    }

    #[tokio::test]
    async fn like_round_trips_through_the_sidecar() {
        let fx = fixture();
        add_clip(&fx, "fav.mp4");

        fx.store.like_clip("fav", true).await.unwrap();
        let result = fx.store.pull_clips(1, 16, None).await.unwrap();
        assert!(result.clips[0].liked);

        fx.store.like_clip("fav", false).await.unwrap();
        let result = fx.store.pull_clips(1, 16, None).await.unwrap();
        assert!(!result.clips[0].liked);
    }

    #[tokio::test]
    async fn rename_moves_the_file_and_its_sidecar_entry() {
        let fx = fixture();
        add_clip(&fx, "old.mp4");
        fx.store.like_clip("old", true).await.unwrap();

        let path = ClipPath::from(fx.clips_dir.join("old.mp4").to_string_lossy().into_owned());
        fx.store.rename_clip(&path, "new.mp4").await.unwrap();

        assert!(!fx.clips_dir.join("old.mp4").exists());
        assert!(fx.clips_dir.join("new.mp4").exists());

        let result = fx.store.pull_clips(1, 16, None).await.unwrap();
        assert_eq!(result.clips[0].name, "new");
        assert!(result.clips[0].liked);
    }

    #[tokio::test]
    async fn rename_refuses_to_clobber_an_existing_clip() {
        let fx = fixture();
        add_clip(&fx, "a.mp4");
        add_clip(&fx, "b.mp4");

        let path = ClipPath::from(fx.clips_dir.join("a.mp4").to_string_lossy().into_owned());
        assert!(fx.store.rename_clip(&path, "b.mp4").await.is_err());
        assert!(fx.clips_dir.join("a.mp4").exists());
    }

    #[tokio::test]
    async fn deleting_a_missing_clip_is_an_error() {
        let fx = fixture();
        let path = ClipPath::from(
            fx.clips_dir
                .join("ghost.mp4")
                .to_string_lossy()
                .into_owned(),
        );
        assert!(fx.store.delete_clip(&path).await.is_err());
    }
}
