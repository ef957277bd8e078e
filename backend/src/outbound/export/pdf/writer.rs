//! Assembles laid-out pages into a PDF file.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use super::PdfEncodeError;
use super::layout::{PAGE_HEIGHT, PAGE_WIDTH};
use super::metrics::FontFace;

/// Graphics state name for the translucent overlay.
pub const OVERLAY_STATE: &str = "GS1";

/// Alpha of the overlay fill, matching `rgba(0, 0, 0, 0.1)`.
const OVERLAY_ALPHA: f32 = 0.1;

fn font_dictionary(face: FontFace) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => face.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Serialise `pages` as an A4 document sharing one resource dictionary.
pub fn write_document(pages: Vec<Vec<Operation>>) -> Result<Vec<u8>, PdfEncodeError> {
    let mut document = Document::with_version("1.7");
    let pages_id = document.new_object_id();

    let regular_id = document.add_object(font_dictionary(FontFace::Regular));
    let bold_id = document.add_object(font_dictionary(FontFace::Bold));
    let overlay_state_id = document.add_object(dictionary! {
        "Type" => "ExtGState",
        "ca" => OVERLAY_ALPHA,
        "CA" => OVERLAY_ALPHA,
    });
    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! {
            FontFace::Regular.resource_name() => regular_id,
            FontFace::Bold.resource_name() => bold_id,
        },
        "ExtGState" => dictionary! {
            OVERLAY_STATE => overlay_state_id,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|err| PdfEncodeError::write(err.to_string()))?;
        let content_id = document.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(Object::from(page_id));
    }

    let count = i64::try_from(kids.len())
        .map_err(|_| PdfEncodeError::write("page count out of range"))?;
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    document
        .save_to(&mut bytes)
        .map_err(|err| PdfEncodeError::write(err.to_string()))?;
    Ok(bytes)
}
