//! # 添付ファイルストア
//!
//! 固定の添付ディレクトリからファイルを読み込む。パイプラインからは読み取り専用。
//!
//! ファイルが見つからない場合、名前が不正な場合、読み込みに失敗した場合は
//! いずれもログを出してその添付をスキップする。メッセージの組み立ては止めない。

use std::{
    io,
    path::{Component, Path, PathBuf},
};

use mailflow_domain::message::Attachment;

/// 添付ファイルストア
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    dir: PathBuf,
}

impl AttachmentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 添付ディレクトリがなければ作成する（起動時に 1 回呼ぶ）
    pub fn ensure_dir(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)
    }

    /// ファイル名を添付ディレクトリ直下のパスに解決する
    ///
    /// 空の名前、絶対パス、`..`、パス区切り文字、ドライブ指定を含む名前は
    /// `None` を返す。解決結果は常に添付ディレクトリの直下になる。
    pub fn resolve(&self, filename: &str) -> Option<PathBuf> {
        if filename.is_empty() || filename.contains(['/', '\\', ':']) {
            return None;
        }

        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Some(self.dir.join(name)),
            _ => None,
        }
    }

    /// 添付ファイルを読み込む
    ///
    /// 見つからない・名前が不正な場合は警告、読み込みに失敗した場合は
    /// エラーログを出して `None` を返す。
    pub async fn load(&self, filename: &str) -> Option<Attachment> {
        let Some(path) = self.resolve(filename) else {
            tracing::warn!(filename, "添付ファイル名が不正なためスキップします");
            return None;
        };

        match tokio::fs::read(&path).await {
            Ok(content) => Some(Attachment::new(filename, content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(
                    filename,
                    path = %path.display(),
                    "添付ファイルが見つからないためスキップします"
                );
                None
            }
            Err(e) => {
                tracing::error!(
                    filename,
                    path = %path.display(),
                    error = %e,
                    "添付ファイルの読み込みに失敗したためスキップします"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn 単純なファイル名はディレクトリ直下に解決される() {
        let store = AttachmentStore::new("/srv/attachments");

        assert_eq!(
            store.resolve("report.pdf"),
            Some(PathBuf::from("/srv/attachments/report.pdf"))
        );
    }

    #[rstest]
    #[case("")]
    #[case("..")]
    #[case(".")]
    #[case("../etc/passwd")]
    #[case("/etc/passwd")]
    #[case("sub/report.pdf")]
    #[case("..\\secret.txt")]
    #[case("C:report.pdf")]
    fn 不正なファイル名は解決しない(#[case] filename: &str) {
        let store = AttachmentStore::new("/srv/attachments");

        assert_eq!(store.resolve(filename), None);
    }

    #[tokio::test]
    async fn 存在するファイルは内容とmimeタイプ付きで読み込まれる() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cases.csv"), "id,name\n1,foo\n").unwrap();
        let store = AttachmentStore::new(dir.path());

        let attachment = store.load("cases.csv").await.unwrap();

        assert_eq!(attachment.filename, "cases.csv");
        assert_eq!(attachment.content_type, "text/csv");
        assert_eq!(attachment.content, b"id,name\n1,foo\n".to_vec());
    }

    #[tokio::test]
    async fn 存在しないファイルはnoneを返す() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path());

        assert_eq!(store.load("missing.pdf").await, None);
    }

    #[tokio::test]
    async fn ディレクトリ外を指す名前はnoneを返す() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path().join("attachments"));
        store.ensure_dir().unwrap();
        std::fs::write(dir.path().join("secret.txt"), "secret").unwrap();

        assert_eq!(store.load("../secret.txt").await, None);
    }

    #[test]
    fn ensure_dirは存在しないディレクトリを作成する() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path().join("nested").join("attachments"));

        store.ensure_dir().unwrap();

        assert!(store.dir().is_dir());
    }
}
