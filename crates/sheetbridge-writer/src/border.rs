//! Rectangular border fills
//!
//! Borders are drawn remotely by a `fillBorder` routine that a sheet defines
//! once and then calls per border. [`BorderRegion::edges`] computes the same
//! edge set locally.

use std::collections::BTreeSet;

use crate::codec::{js_string, Rgb};
use crate::style::{BorderLayer, BorderOptions, LineStyle};

/// Name of the remote helper routine
pub const FILL_BORDER: &str = "fillBorder";

/// Definition of the remote helper routine
pub(crate) const FILL_BORDER_DEF: &str = "function fillBorder(sheet,rs,cs,re,ce,color,style,opts){\
var outer=opts.outer,inner=opts.inner;\
for(var ri=rs;ri<=re;ri++){for(var ci=cs;ci<=ce;ci++){\
var c=sheet.GetRangeByNumber(ri,ci);\
if(!outer&&!inner){c.SetBorders('Top',style,color);c.SetBorders('Bottom',style,color);\
c.SetBorders('Left',style,color);c.SetBorders('Right',style,color);continue;}\
if(outer){var os=outer.style||style,oc=outer.color||color;\
if(ri===rs)c.SetBorders('Top',os,oc);if(ri===re)c.SetBorders('Bottom',os,oc);\
if(ci===cs)c.SetBorders('Left',os,oc);if(ci===ce)c.SetBorders('Right',os,oc);}\
if(inner){var is=inner.style||style,ic=inner.color||color;\
if(ri>rs)c.SetBorders('Top',is,ic);if(ri<re)c.SetBorders('Bottom',is,ic);\
if(ci>cs)c.SetBorders('Left',is,ic);if(ci<ce)c.SetBorders('Right',is,ic);}\
}}}";

/// One side of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

/// A single cell side touched by a border fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    pub row: u32,
    pub col: u32,
    pub side: Side,
}

/// Inclusive cell rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BorderRegion {
    pub rs: u32,
    pub cs: u32,
    pub re: u32,
    pub ce: u32,
}

impl BorderRegion {
    /// Create a region, normalizing reversed corners
    pub fn new(rs: u32, cs: u32, re: u32, ce: u32) -> Self {
        Self {
            rs: rs.min(re),
            cs: cs.min(ce),
            re: rs.max(re),
            ce: cs.max(ce),
        }
    }

    /// Edges a fill with `options` sets, matching the remote routine
    pub fn edges(&self, options: &BorderOptions) -> BTreeSet<Edge> {
        let mut edges = BTreeSet::new();
        for row in self.rs..=self.re {
            for col in self.cs..=self.ce {
                let mut push = |side| {
                    edges.insert(Edge { row, col, side });
                };
                if options.outer.is_none() && options.inner.is_none() {
                    push(Side::Top);
                    push(Side::Bottom);
                    push(Side::Left);
                    push(Side::Right);
                    continue;
                }
                if options.outer.is_some() {
                    if row == self.rs {
                        push(Side::Top);
                    }
                    if row == self.re {
                        push(Side::Bottom);
                    }
                    if col == self.cs {
                        push(Side::Left);
                    }
                    if col == self.ce {
                        push(Side::Right);
                    }
                }
                if options.inner.is_some() {
                    if row > self.rs {
                        push(Side::Top);
                    }
                    if row < self.re {
                        push(Side::Bottom);
                    }
                    if col > self.cs {
                        push(Side::Left);
                    }
                    if col < self.ce {
                        push(Side::Right);
                    }
                }
            }
        }
        edges
    }

    /// Instruction calling the remote routine for this region
    pub(crate) fn call(&self, color: Rgb, style: &LineStyle, options: &BorderOptions) -> String {
        format!(
            "{}(sheet,{},{},{},{},{},{},{})",
            FILL_BORDER,
            self.rs,
            self.cs,
            self.re,
            self.ce,
            color.to_engine(),
            js_string(style.as_engine_str()),
            options_literal(options)
        )
    }
}

/// Object literal for the routine's `opts`; colors stay engine expressions
fn options_literal(options: &BorderOptions) -> String {
    let layers = [("outer", &options.outer), ("inner", &options.inner)];
    let fields: Vec<String> = layers
        .iter()
        .filter_map(|(name, layer)| layer.as_ref().map(|l| format!("{}:{}", name, layer_literal(l))))
        .collect();
    format!("{{{}}}", fields.join(","))
}

fn layer_literal(layer: &BorderLayer) -> String {
    let mut fields = Vec::new();
    if let Some(color) = &layer.color {
        fields.push(format!("color:{}", Rgb::from_hex(color).to_engine()));
    }
    if let Some(style) = &layer.style {
        fields.push(format!("style:{}", js_string(style.as_engine_str())));
    }
    format!("{{{}}}", fields.join(","))
}
