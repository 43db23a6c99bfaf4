//! Well-Known Text (WKT1, plus the common WKT2 keywords) to parameter record.
//!
//! The text is first parsed into a tree of `KEYWORD[arg, ...]` nodes, then
//! the tree is walked for the pieces the transform pipeline needs: projection
//! method and parameters, datum, ellipsoid, towgs84, prime meridian, linear
//! unit and axis order.

use tracing::debug;

use crate::catalog;
use crate::constants::D2R;
use crate::defs::conversion::ConversionParams;
use crate::defs::{proj_string, EPSG_3857};
use crate::error::ProjError;
use crate::params::ProjectionParams;

/// Root keywords that mark a string as WKT.
pub const MARKERS: &[&str] = &[
    "PROJECTEDCRS",
    "PROJCRS",
    "GEOGCS",
    "GEOCCS",
    "PROJCS",
    "LOCAL_CS",
    "GEODCRS",
    "GEODETICCRS",
    "GEODETICDATUM",
    "GEOGCRS",
    "ENGCRS",
    "ENGINEERINGCRS",
];

pub fn is_wkt(code: &str) -> bool {
    MARKERS.iter().any(|m| code.contains(m))
}

#[derive(Clone, Debug, PartialEq)]
enum Value {
    Node(Node),
    Str(String),
    Num(f64),
    Word(String),
}

#[derive(Clone, Debug, PartialEq)]
struct Node {
    keyword: String,
    args: Vec<Value>,
}

impl Node {
    fn is(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.keyword.eq_ignore_ascii_case(k))
    }

    fn children<'a>(&'a self, keywords: &'static [&'static str]) -> impl Iterator<Item = &'a Node> + 'a {
        self.args.iter().filter_map(move |v| match v {
            Value::Node(n) if n.is(keywords) => Some(n),
            _ => None,
        })
    }

    fn child(&self, keywords: &[&str]) -> Option<&Node> {
        self.args.iter().find_map(|v| match v {
            Value::Node(n) if n.is(keywords) => Some(n),
            _ => None,
        })
    }

    /// First quoted argument.
    fn name(&self) -> Option<&str> {
        self.args.iter().find_map(|v| match v {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// The `i`-th numeric argument.
    fn num(&self, i: usize) -> Option<f64> {
        self.args
            .iter()
            .filter_map(|v| match v {
                Value::Num(n) => Some(*n),
                Value::Str(s) => s.trim().parse().ok(),
                _ => None,
            })
            .nth(i)
    }

    fn nums(&self) -> Vec<f64> {
        self.args
            .iter()
            .filter_map(|v| match v {
                Value::Num(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    /// Second argument as text, quoted or bare (`AXIS["x", EAST]`).
    fn word(&self, i: usize) -> Option<&str> {
        match self.args.get(i)? {
            Value::Str(s) | Value::Word(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn error(&self, msg: &str) -> ProjError {
        ProjError::Definition(format!("WKT {msg} at byte {}", self.pos))
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    fn parse_root(mut self) -> Result<Node, ProjError> {
        self.skip_ws();
        match self.parse_value()? {
            Value::Node(node) => Ok(node),
            _ => Err(self.error("does not start with a keyword")),
        }
    }

    fn parse_value(&mut self) -> Result<Value, ProjError> {
        self.skip_ws();
        match self.peek() {
            Some(b'"') => self.parse_string().map(Value::Str),
            Some(c) if c.is_ascii_digit() || matches!(c, b'-' | b'+' | b'.') => {
                let text = self.take_while(|c| c.is_ascii_digit() || matches!(c, b'-' | b'+' | b'.' | b'e' | b'E'));
                text.parse()
                    .map(Value::Num)
                    .map_err(|_| self.error(&format!("bad number {text:?}")))
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let word = self.take_while(|c| c.is_ascii_alphanumeric() || c == b'_');
                self.skip_ws();
                match self.peek() {
                    Some(b'[') | Some(b'(') => {
                        self.pos += 1;
                        let args = self.parse_args()?;
                        Ok(Value::Node(Node {
                            keyword: word.to_ascii_uppercase(),
                            args,
                        }))
                    }
                    _ => Ok(Value::Word(word.to_owned())),
                }
            }
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("ended early")),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Value>, ProjError> {
        let mut args = Vec::new();
        loop {
            self.skip_ws();
            if let Some(b']') | Some(b')') = self.peek() {
                self.pos += 1;
                return Ok(args);
            }
            args.push(self.parse_value()?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') | Some(b')') => {}
                _ => return Err(self.error("expected ',' or closing bracket")),
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, ProjError> {
        self.pos += 1;
        let mut out = String::new();
        loop {
            let rest = &self.src[self.pos..];
            let Some(end) = rest.find('"') else {
                return Err(self.error("unterminated string"));
            };
            out.push_str(&rest[..end]);
            self.pos += end + 1;
            // "" is an escaped quote
            if self.peek() == Some(b'"') {
                out.push('"');
                self.pos += 1;
            } else {
                return Ok(out);
            }
        }
    }
}

/// Parse WKT into a parameter record.
pub fn parse(wkt: &str) -> Result<ProjectionParams, ProjError> {
    let root = Parser::new(wkt).parse_root()?;
    interpret(&root)
}

fn interpret(root: &Node) -> Result<ProjectionParams, ProjError> {
    if is_web_mercator(root) {
        return proj_string::parse(EPSG_3857);
    }
    if let Some(def) = proj4_extension(root) {
        debug!("WKT carries a PROJ4 extension, using it");
        return proj_string::parse(def);
    }

    let mut p = ProjectionParams {
        title: root.name().map(str::to_owned),
        ..Default::default()
    };

    match root.keyword.as_str() {
        "PROJCS" | "PROJCRS" | "PROJECTEDCRS" => projected(root, &mut p)?,
        "GEOGCS" | "GEOGCRS" | "BASEGEOGCRS" => geographic(root, &mut p),
        "GEODCRS" | "GEODETICCRS" => {
            geographic(root, &mut p);
            let cartesian = root
                .child(&["CS"])
                .and_then(|cs| cs.word(0))
                .is_some_and(|t| t.eq_ignore_ascii_case("cartesian"));
            if cartesian {
                p.proj_name = Some("geocent".into());
            }
        }
        "GEOCCS" => {
            geographic(root, &mut p);
            p.proj_name = Some("geocent".into());
            p.units = Some("meter".into());
            p.to_meter = Some(1.0);
        }
        "LOCAL_CS" | "ENGCRS" | "ENGINEERINGCRS" => {
            p.proj_name = Some("identity".into());
            p.datum_code = Some("none".into());
            apply_unit(root, &mut p);
        }
        "COMPD_CS" | "COMPOUNDCRS" => {
            let horizontal = root
                .child(&["PROJCS", "PROJCRS", "GEOGCS", "GEOGCRS", "GEODCRS"])
                .ok_or_else(|| ProjError::Definition("compound CRS without a horizontal part".into()))?;
            return interpret(horizontal);
        }
        other => {
            return Err(ProjError::Definition(format!("unsupported WKT root {other}")));
        }
    }

    if let Some(axis) = axis_order(root) {
        p.axis = Some(axis);
    }
    Ok(p)
}

fn is_web_mercator(root: &Node) -> bool {
    const CODES: &[&str] = &["3857", "900913", "3785", "102113"];
    root.child(&["AUTHORITY", "ID"]).is_some_and(|auth| {
        let code = match auth.args.get(1) {
            Some(Value::Str(s)) => s.clone(),
            Some(Value::Num(n)) => format!("{n}"),
            _ => return false,
        };
        CODES.contains(&code.as_str())
    })
}

fn proj4_extension(root: &Node) -> Option<&str> {
    root.children(&["EXTENSION"])
        .find(|ext| ext.name().is_some_and(|n| n.eq_ignore_ascii_case("PROJ4")))
        .and_then(|ext| match ext.args.get(1) {
            Some(Value::Str(s)) => Some(s.as_str()),
            _ => None,
        })
}

fn geographic(geog: &Node, p: &mut ProjectionParams) {
    p.proj_name = Some("longlat".into());
    p.units = Some("degrees".into());
    datum(geog, p);
}

fn datum(geog: &Node, p: &mut ProjectionParams) {
    if let Some(pm) = geog.child(&["PRIMEM"]) {
        let factor = pm
            .child(&["ANGLEUNIT", "UNIT"])
            .and_then(|u| u.num(0))
            .unwrap_or(D2R);
        if let Some(v) = pm.num(0) {
            p.from_greenwich = Some(v * factor);
        }
    }

    let Some(datum) = geog.child(&["DATUM", "ENSEMBLE", "GEODETICDATUM", "TRF"]) else {
        return;
    };
    if let Some(name) = datum.name() {
        p.datum_code = Some(datum_code(name));
    }
    if let Some(ellipsoid) = datum.child(&["SPHEROID", "ELLIPSOID"]) {
        if let Some(name) = ellipsoid.name() {
            p.ellps = Some(ellipsoid_code(name));
        }
        p.a = ellipsoid.num(0);
        p.rf = ellipsoid.num(1);
    }
    if let Some(towgs84) = datum.child(&["TOWGS84"]) {
        p.datum_params = Some(towgs84.nums());
    }
}

/// Normalise a WKT datum name to a catalog code where one is known.
pub(crate) fn datum_code(name: &str) -> String {
    let mut code = name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("_");
    if let Some(rest) = code.strip_prefix("d_") {
        code = rest.to_owned();
    }
    match code.as_str() {
        "new_zealand_1949" | "new_zealand_geodetic_datum_1949" => return "nzgd49".into(),
        "wgs_1984" | "world_geodetic_system_1984" => return "wgs84".into(),
        "belge_1972" => return "rnb72".into(),
        "ch1903+" => return "ch1903".into(),
        _ => {}
    }
    if code.contains("osgb_1936") {
        "osgb36".into()
    } else if code.contains("osni_1952") {
        "osni52".into()
    } else if code.contains("tm65") || code.contains("geodetic_datum_of_1965") {
        "ire65".into()
    } else {
        code
    }
}

fn ellipsoid_code(name: &str) -> String {
    let ellps = name.replacen("_19", "", 1).replace("Clarke_18", "clrk").replace("clarke_18", "clrk");
    if ellps.to_lowercase().starts_with("international") {
        "intl".into()
    } else {
        ellps
    }
}

/// Linear unit of the CRS: root `UNIT`/`LENGTHUNIT`, else the first axis unit.
fn apply_unit(root: &Node, p: &mut ProjectionParams) {
    let unit = root.child(&["UNIT", "LENGTHUNIT"]).or_else(|| {
        root.child(&["CS"])
            .into_iter()
            .chain(root.children(&["AXIS"]))
            .find_map(|n| n.child(&["LENGTHUNIT", "UNIT"]))
    });
    if let Some(unit) = unit {
        let mut name = unit.name().unwrap_or("meter").to_lowercase();
        if name == "metre" {
            name = "meter".into();
        }
        p.to_meter = unit.num(0).or_else(|| catalog::units::to_meter(&name));
        p.units = Some(name);
    }
}

fn projected(root: &Node, p: &mut ProjectionParams) -> Result<(), ProjError> {
    if let Some(geog) = root.child(&["GEOGCS", "BASEGEOGCRS", "BASEGEODCRS", "GEOGCRS"]) {
        datum(geog, p);
    }
    apply_unit(root, p);
    let to_meter = p.to_meter.unwrap_or(1.0);

    let conversion = root.child(&["CONVERSION"]);
    let method = root
        .child(&["PROJECTION"])
        .or_else(|| conversion.and_then(|c| c.child(&["METHOD", "PROJECTION"])))
        .and_then(Node::name)
        .ok_or_else(|| ProjError::Definition("WKT projected CRS without a projection".into()))?;
    p.proj_name = Some(method.to_owned());

    let mut collected = ConversionParams::default();
    let params = root
        .children(&["PARAMETER"])
        .chain(conversion.into_iter().flat_map(|c| c.children(&["PARAMETER"])));
    for param in params {
        let (Some(name), Some(value)) = (param.name(), param.num(0)) else {
            continue;
        };
        // WKT2 parameters carry their own unit, WKT1 ones use the CRS units
        let own_unit = param
            .child(&["ANGLEUNIT", "LENGTHUNIT", "SCALEUNIT", "UNIT"])
            .and_then(|u| u.num(0));
        collected.set(name, value, own_unit, to_meter);
    }
    collected.apply(method, p);
    Ok(())
}

/// Axis order from the root `AXIS` entries, or `None` when they do not
/// spell out a recognisable easting/northing pair.
fn axis_order(root: &Node) -> Option<String> {
    let mut order = String::new();
    for axis in root.children(&["AXIS"]) {
        let name = axis.word(0).unwrap_or_default().to_lowercase();
        let dir = axis.word(1).unwrap_or_default().to_lowercase();
        let letter = if name.contains("north") || ((name == "y" || name == "lat") && dir == "north") {
            'n'
        } else if name.contains("south") || ((name == "y" || name == "lat") && dir == "south") {
            's'
        } else if name.contains("east") || ((name == "x" || name == "lon") && dir == "east") {
            'e'
        } else if name.contains("west") || ((name == "x" || name == "lon") && dir == "west") {
            'w'
        } else {
            continue;
        };
        order.push(letter);
    }
    if order.len() == 2 {
        order.push('u');
    }
    (order.len() == 3).then_some(order)
}
