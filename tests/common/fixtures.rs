use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use texsplit::composer::{self, ComposerError};
use texsplit::{LopdfArtifacts, PageArtifacts, RenderError, Renderer};

/// Writes a PDF whose page `n` shows the text `page n`.
pub fn write_pdf(path: &Path, num_pages: u32) -> Result<(), lopdf::Error> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for i in 1..=num_pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::String(format!("page {}", i).into_bytes(), StringFormat::Literal)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => num_pages as i64,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }
        .into(),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path)?;
    Ok(())
}

/// Builds a source of `pages` pages, each holding the line `Page n`, with
/// one sentinel after every page listed in `split_after`.
pub fn source_with_splits(pages: u32, split_after: &[u32], sentinel: &str) -> String {
    let mut lines = vec!["\\documentclass{article}".to_string(), "\\begin{document}".to_string()];
    for page in 1..=pages {
        lines.push(format!("Page {}", page));
        for _ in split_after.iter().filter(|&&p| p == page) {
            lines.push(sentinel.to_string());
        }
        if page < pages {
            lines.push("\\newpage".to_string());
        }
    }
    lines.push("\\end{document}".to_string());
    lines.join("\n")
}

/// A stand-in for pdflatex.
///
/// Starts on page 1, turns a page on every `\newpage` line and writes
/// `\typeout{<text> \thepage}` lines to the log with the current page
/// substituted. Leaves `<stem>.pdf` and `<stem>.log` in the working
/// directory, surrounded by the kind of noise a real TeX log has, plus the
/// exact bytes it was given in `<stem>.received`.
#[derive(Debug, Clone)]
pub struct SimulatedTypesetter {
    pub stem: String,
    pub write_log: bool,
}

impl SimulatedTypesetter {
    pub fn new(stem: &str) -> Self {
        Self { stem: stem.to_string(), write_log: true }
    }

    pub fn without_log(mut self) -> Self {
        self.write_log = false;
        self
    }
}

impl Renderer for SimulatedTypesetter {
    fn render(&self, lines: &[Vec<u8>], working_dir: &Path) -> Result<(), RenderError> {
        let mut page = 1;
        let mut log = vec![
            "This is SimulatedTeX, Version 3.141592653".to_string(),
            "entering extended mode".to_string(),
            format!("(./{}.tex", self.stem),
            "zzzzzzzz_texsplit 1".to_string(),
        ];
        for line in lines.iter().map(|line| String::from_utf8_lossy(line)) {
            if line.trim() == "\\newpage" {
                log.push(format!("[{}]", page));
                page += 1;
            } else if let Some(text) = line.strip_prefix("\\typeout{").and_then(|rest| rest.strip_suffix("}")) {
                log.push(text.replace("\\thepage", &page.to_string()));
            }
        }
        log.push(format!("Output written on {}.pdf ({} pages, 4242 bytes).", self.stem, page));

        let mut received = lines.join(&b'\n');
        received.push(b'\n');
        std::fs::write(working_dir.join(format!("{}.received", self.stem)), received).expect("received source");

        write_pdf(&working_dir.join(format!("{}.pdf", self.stem)), page).expect("simulated pdf");
        if self.write_log {
            std::fs::write(working_dir.join(format!("{}.log", self.stem)), log.join("\n") + "\n")
                .expect("simulated log");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "simulated-tex"
    }
}

/// lopdf page operations that lose some page files right after extracting
/// them, so merges touching those pages fail.
#[derive(Debug, Default)]
pub struct LossyArtifacts {
    pub lost_pages: HashSet<u32>,
}

impl LossyArtifacts {
    pub fn losing(pages: &[u32]) -> Self {
        Self { lost_pages: pages.iter().copied().collect() }
    }
}

impl PageArtifacts for LossyArtifacts {
    fn page_count(&self, path: &Path) -> Result<u32, ComposerError> {
        LopdfArtifacts.page_count(path)
    }

    fn split_into_pages(&self, path: &Path, dest_dir: &Path, stem: &str) -> Result<Vec<PathBuf>, ComposerError> {
        let files = LopdfArtifacts.split_into_pages(path, dest_dir, stem)?;
        for page in &self.lost_pages {
            std::fs::remove_file(dest_dir.join(composer::page_file_name(stem, *page)))?;
        }
        Ok(files)
    }

    fn merge_pages(&self, files: &[PathBuf], dest: &Path) -> Result<PathBuf, ComposerError> {
        LopdfArtifacts.merge_pages(files, dest)
    }
}

/// lopdf page operations whose merges touching `slow_page` first sleep for
/// `delay`.
#[derive(Debug)]
pub struct SlowArtifacts {
    pub slow_page: PathBuf,
    pub delay: Duration,
}

impl PageArtifacts for SlowArtifacts {
    fn page_count(&self, path: &Path) -> Result<u32, ComposerError> {
        LopdfArtifacts.page_count(path)
    }

    fn split_into_pages(&self, path: &Path, dest_dir: &Path, stem: &str) -> Result<Vec<PathBuf>, ComposerError> {
        LopdfArtifacts.split_into_pages(path, dest_dir, stem)
    }

    fn merge_pages(&self, files: &[PathBuf], dest: &Path) -> Result<PathBuf, ComposerError> {
        if files.iter().any(|file| file.file_name() == self.slow_page.file_name()) {
            std::thread::sleep(self.delay);
        }
        LopdfArtifacts.merge_pages(files, dest)
    }
}
