//! Sequential PDF assembly
//!
//! Consumes the ordered assets one by one and appends one output page per
//! image. Encoding into a single output stream is inherently serial, so
//! there is nothing to parallelize here. A page that fails to decode is
//! logged and skipped; the document always finalizes exactly once, after
//! the last asset, whatever happened before.
//!
//! Pages are US Letter (612×792 pt). Images are embedded at 72 dpi so one
//! normalized pixel maps to one point, drawn left-aligned with their top
//! edge on the top of the page.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::{Image as PdfImage, ImageTransform, Mm, PdfDocument, Pt};
use tracing::{debug, info, warn};

use crate::app::coordinator::OrderedAsset;
use crate::app::manifest::{title_slug, ChapterRange};
use crate::app::normalizer::fit_to_device;
use crate::constants::{files, page};
use crate::errors::{AssemblyError, AssemblyResult};

/// Builds one PDF per run in a fixed output directory
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    output_dir: PathBuf,
}

impl DocumentAssembler {
    /// Create an assembler writing into the given directory
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Deterministic output path for a (title, range) run
    pub fn document_path(&self, title: &str, range: ChapterRange) -> PathBuf {
        self.output_dir.join(format!(
            "{}, {}-{}.{}",
            title_slug(title),
            range.start(),
            range.end(),
            files::DOCUMENT_EXTENSION
        ))
    }

    /// Assemble the ordered assets into a single PDF
    ///
    /// An existing document with the same name is silently overwritten. An
    /// empty asset list still produces a (zero-page) document.
    ///
    /// # Errors
    ///
    /// Returns `AssemblyError` only when the document itself cannot be
    /// produced; undecodable individual pages are skipped instead.
    pub fn assemble(
        &self,
        assets: &[OrderedAsset],
        title: &str,
        range: ChapterRange,
    ) -> AssemblyResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        let output_path = self.document_path(title, range);

        info!(
            title,
            pages = assets.len(),
            "assembling document {}",
            output_path.display()
        );

        let document = PdfDocument::empty(title);
        let mut rendered = 0usize;

        for asset in assets {
            let source = match decode_asset(&asset.path) {
                Ok(image) => image,
                Err(reason) => {
                    warn!(
                        chapter = asset.chapter,
                        page = asset.page,
                        %reason,
                        "skipping undecodable page"
                    );
                    continue;
                }
            };

            let (resized, rendered_height) = fit_to_device(&source);
            draw_page(&document, &resized, rendered_height);
            rendered += 1;
            debug!(
                chapter = asset.chapter,
                page = asset.page,
                "added page {rendered}"
            );
        }

        // finalize exactly once, even when every asset was skipped
        let file = File::create(&output_path)?;
        document
            .save(&mut BufWriter::new(file))
            .map_err(|e| AssemblyError::PdfWrite {
                reason: e.to_string(),
            })?;

        info!(
            title,
            rendered,
            skipped = assets.len() - rendered,
            "saved {}",
            output_path.display()
        );
        Ok(output_path)
    }
}

/// Decode an asset, sniffing the real format from the file contents
///
/// Assets are always named `.jpg`, but sources occasionally serve PNG or
/// WebP bytes under a jpg URL; the extension cannot be trusted.
fn decode_asset(path: &Path) -> Result<image::DynamicImage, String> {
    let reader = image::io::Reader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| e.to_string())?;
    reader.decode().map_err(|e| e.to_string())
}

/// Append one page and draw the image top-anchored, left-aligned
fn draw_page(
    document: &printpdf::PdfDocumentReference,
    image: &image::DynamicImage,
    rendered_height: u32,
) {
    let (page_index, layer_index) = document.add_page(
        Mm::from(Pt(page::WIDTH_PT as f32)),
        Mm::from(Pt(page::HEIGHT_PT as f32)),
        "page",
    );
    let layer = document.get_page(page_index).get_layer(layer_index);

    // flatten to RGB8 so the embedded stream never carries an alpha
    // channel the resize did not produce
    let rgb = image::DynamicImage::ImageRgb8(image.to_rgb8());
    let embedded = PdfImage::from_dynamic_image(&rgb);

    // PDF origin is bottom-left; anchoring the image top to the page top
    // puts its bottom edge at page_height - rendered_height
    let baseline = page::HEIGHT_PT - f64::from(rendered_height);
    embedded.add_to_layer(
        layer,
        ImageTransform {
            translate_x: Some(Mm::from(Pt(0.0))),
            translate_y: Some(Mm::from(Pt(baseline as f32))),
            dpi: Some(page::RENDER_DPI as f32),
            ..Default::default()
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat};
    use tempfile::TempDir;

    /// A PDF file starts with a `%PDF` header
    fn looks_like_pdf(path: &Path) -> bool {
        std::fs::read(path)
            .map(|bytes| bytes.starts_with(b"%PDF"))
            .unwrap_or(false)
    }

    fn write_png(path: &Path, width: u32, height: u32) {
        let image = DynamicImage::new_rgb8(width, height);
        let mut file = File::create(path).unwrap();
        image
            .write_to(
                &mut BufWriter::new(&mut file),
                ImageOutputFormat::Png,
            )
            .unwrap();
    }

    fn asset(chapter: u32, page: u32, path: &Path) -> OrderedAsset {
        OrderedAsset {
            chapter,
            page,
            path: path.to_path_buf(),
        }
    }

    #[test]
    fn test_assembles_document_from_assets() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("chapter_1_page_1.jpg");
        let second = temp.path().join("chapter_1_page_2.jpg");
        // PNG bytes under a .jpg name; decoding must sniff the content
        write_png(&first, 1200, 800);
        write_png(&second, 800, 1600);

        let assembler = DocumentAssembler::new(temp.path().join("out"));
        let range = ChapterRange::new(1, 1).unwrap();
        let assets = vec![asset(1, 1, &first), asset(1, 2, &second)];

        let path = assembler.assemble(&assets, "Assembly Test", range).unwrap();
        assert!(path.ends_with("Assembly-Test, 1-1.pdf"));
        assert!(looks_like_pdf(&path));
    }

    #[test]
    fn test_empty_assets_still_produce_a_document() {
        let temp = TempDir::new().unwrap();
        let assembler = DocumentAssembler::new(temp.path());
        let range = ChapterRange::new(40, 50).unwrap();

        let path = assembler.assemble(&[], "Empty Test", range).unwrap();
        assert!(looks_like_pdf(&path));
    }

    #[test]
    fn test_undecodable_page_is_skipped_not_fatal() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("chapter_1_page_1.jpg");
        let bad = temp.path().join("chapter_1_page_2.jpg");
        write_png(&good, 600, 800);
        std::fs::write(&bad, b"this is not an image").unwrap();

        let assembler = DocumentAssembler::new(temp.path().join("out"));
        let range = ChapterRange::new(1, 1).unwrap();
        let assets = vec![asset(1, 1, &good), asset(1, 2, &bad)];

        let path = assembler.assemble(&assets, "Skip Test", range).unwrap();
        assert!(looks_like_pdf(&path));
    }

    #[test]
    fn test_same_run_overwrites_previous_document() {
        let temp = TempDir::new().unwrap();
        let page_file = temp.path().join("chapter_2_page_1.jpg");
        write_png(&page_file, 600, 800);

        let assembler = DocumentAssembler::new(temp.path().join("out"));
        let range = ChapterRange::new(2, 2).unwrap();
        let assets = vec![asset(2, 1, &page_file)];

        let first = assembler.assemble(&assets, "Overwrite Test", range).unwrap();
        let second = assembler.assemble(&assets, "Overwrite Test", range).unwrap();
        assert_eq!(first, second);
        assert!(looks_like_pdf(&second));
    }
}
