// 原子文件替换
//
// 配置与渲染页共用的写入协议：
// 1. 写入 `<name>.<ext>.tmp`
// 2. 目标文件存在时先备份到 `<name>.<ext>.bak`
// 3. 重命名临时文件到目标文件，成功后删除备份，失败则从备份恢复

use anyhow::Result;
use std::path::{Path, PathBuf};

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    match path.extension() {
        Some(ext) => path.with_extension(format!("{}.{}", ext.to_string_lossy(), suffix)),
        None => path.with_extension(suffix),
    }
}

/// 原子替换文件内容
pub(crate) fn replace_file(path: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = sibling(path, "tmp");
    let backup_path = sibling(path, "bak");

    std::fs::write(&temp_path, contents).map_err(|e| {
        tracing::error!("写入临时文件失败 {:?}: {}", temp_path, e);
        e
    })?;

    if path.exists() {
        if backup_path.exists() {
            let _ = std::fs::remove_file(&backup_path);
        }
        std::fs::rename(path, &backup_path).map_err(|e| {
            tracing::error!("备份旧文件失败 {:?}: {}", path, e);
            e
        })?;
    }

    match std::fs::rename(&temp_path, path) {
        Ok(_) => {
            let _ = std::fs::remove_file(&backup_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!("重命名临时文件失败 {:?}: {}", temp_path, e);
            if backup_path.exists() {
                if let Err(restore_err) = std::fs::rename(&backup_path, path) {
                    tracing::error!("恢复备份失败: {}", restore_err);
                } else {
                    tracing::info!("已从备份恢复 {:?}", path);
                }
            }
            let _ = std::fs::remove_file(&temp_path);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_file_should_create_and_overwrite() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("page.html");

        replace_file(&path, b"first").expect("first write");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first");

        replace_file(&path, b"second").expect("second write");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");

        assert!(!temp.path().join("page.html.tmp").exists());
        assert!(!temp.path().join("page.html.bak").exists());
    }

    #[test]
    fn replace_file_should_fail_when_dir_missing() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("missing").join("config.json");

        assert!(replace_file(&path, b"{}").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn sibling_should_keep_extension() {
        assert_eq!(
            sibling(Path::new("/a/config.json"), "bak"),
            PathBuf::from("/a/config.json.bak")
        );
        assert_eq!(sibling(Path::new("/a/notes"), "tmp"), PathBuf::from("/a/notes.tmp"));
    }
}
