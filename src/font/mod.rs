mod bitmap_font;
mod cache;
mod glyph_run;

pub use bitmap_font::*;
pub use cache::*;
pub use glyph_run::*;

/// Vertical distance between consecutive text lines, as a multiple of the
/// font height.
pub const LINE_PITCH: f32 = 1.2;

#[cfg(test)]
pub(crate) fn fixed_width_font(advance: i32, height: i32) -> std::rc::Rc<BitmapFont> {
    use crate::ui::{Texture, TextureId};
    use std::fmt::Write;

    let mut descriptor = String::from(
        "info face=\"Test\" size=16\ncommon lineHeight=16 base=13 scaleW=256 scaleH=256 pages=1\n\
         page id=0 file=\"test.png\"\nchars count=95\n",
    );
    for code in 32u32..127 {
        writeln!(
            descriptor,
            "char id={code} x=0 y=0 width={advance} height={height} xoffset=0 yoffset=0 xadvance={advance} page=0 chnl=15"
        )
        .unwrap();
    }
    let font = BitmapFont::from_descriptor(&descriptor, std::path::Path::new("fonts"), |_| {
        Ok(Texture {
            id: TextureId(900),
            width: 256,
            height: 256,
        })
    })
    .unwrap();
    std::rc::Rc::new(font)
}
