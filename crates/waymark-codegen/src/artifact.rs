//! 产物落盘：把渲染好的源码写进 `OUT_DIR`，并清理上一轮构建留下的旧文件。
//!
//! 文件名形如 `route_mapping_<unix-millis>.rs`，每轮构建唯一；内容本身与时间无关。

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::CodegenError;

const ARTIFACT_PREFIX: &str = "route_mapping_";
const ARTIFACT_SUFFIX: &str = ".rs";

/// JSON 清单的固定文件名。
pub const MANIFEST_FILE: &str = "route_manifest.json";

/// 一次写盘的结果。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WrittenArtifacts {
    /// 生成的 Rust 源码路径。
    pub source: PathBuf,
    /// JSON 清单路径，未开启时为 `None`。
    pub manifest: Option<PathBuf>,
    /// 本轮被删除的旧产物。
    pub pruned: Vec<PathBuf>,
}

/// 写出源码（以及可选的清单），返回各文件路径。
pub fn write_artifacts(
    out_dir: &Path,
    source: &str,
    manifest: Option<&str>,
) -> Result<WrittenArtifacts, CodegenError> {
    fs::create_dir_all(out_dir).map_err(|err| CodegenError::io(out_dir, err))?;

    let file_name = unique_file_name(out_dir);
    let source_path = out_dir.join(&file_name);
    let pruned = prune_stale(out_dir, &file_name)?;
    fs::write(&source_path, source).map_err(|err| CodegenError::io(&source_path, err))?;
    tracing::info!(
        target: "waymark::generator",
        path = %source_path.display(),
        pruned = pruned.len(),
        "route table written"
    );

    let manifest = match manifest {
        Some(json) => {
            let path = out_dir.join(MANIFEST_FILE);
            fs::write(&path, json).map_err(|err| CodegenError::io(&path, err))?;
            tracing::debug!(
                target: "waymark::generator",
                path = %path.display(),
                "manifest written"
            );
            Some(path)
        }
        None => None,
    };

    Ok(WrittenArtifacts {
        source: source_path,
        manifest,
        pruned,
    })
}

/// 当前毫秒时间戳命名；同一毫秒内已有同名文件时向后顺延。
fn unique_file_name(out_dir: &Path) -> String {
    let mut millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    loop {
        let name = format!("{ARTIFACT_PREFIX}{millis}{ARTIFACT_SUFFIX}");
        if !out_dir.join(&name).exists() {
            return name;
        }
        millis += 1;
    }
}

fn prune_stale(out_dir: &Path, keep: &str) -> Result<Vec<PathBuf>, CodegenError> {
    let mut pruned = Vec::new();
    let entries = fs::read_dir(out_dir).map_err(|err| CodegenError::io(out_dir, err))?;
    for entry in entries {
        let entry = entry.map_err(|err| CodegenError::io(out_dir, err))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name != keep && is_artifact_name(name) {
            let path = entry.path();
            fs::remove_file(&path).map_err(|err| CodegenError::io(&path, err))?;
            pruned.push(path);
        }
    }
    pruned.sort();
    Ok(pruned)
}

fn is_artifact_name(name: &str) -> bool {
    name.strip_prefix(ARTIFACT_PREFIX)
        .and_then(|rest| rest.strip_suffix(ARTIFACT_SUFFIX))
        .is_some_and(|stamp| !stamp.is_empty() && stamp.bytes().all(|b| b.is_ascii_digit()))
}
