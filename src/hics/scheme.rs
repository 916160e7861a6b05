//! Schemes: named calendar configurations
//!
//! A scheme pairs a calendar base with a grammar and performs every
//! text conversion: day counts, ranges and range lists to text and
//! back. Partial dates complete to ranges through the base's per-field
//! begin/end values, and rendering picks the shortest field prefix
//! that reproduces the range exactly, so the year range 1948 renders
//! as "1948" rather than "1 Jan 1948..31 Dec 1948".

use std::collections::HashMap;
use std::rc::Rc;

use crate::field::{Field, F_INVALID, F_MAXIMUM, F_MINIMUM};
use crate::hics::base::Base;
use crate::hics::format::{Format, LexiconMap};
use crate::hics::grammar::Grammar;
use crate::range::{well_order, Range, RangeList};

/// The registries a text conversion reads: threaded explicitly through
/// every call rather than reached through shared state.
pub struct TextContext<'a> {
    pub lexicons: &'a LexiconMap,
    pub formats: &'a HashMap<String, Rc<Format>>,
    pub grammars: &'a HashMap<String, Rc<Grammar>>,
}

#[derive(Debug, Clone)]
pub struct Scheme {
    pub code: String,
    pub name: String,
    pub base: Base,
    /// Code of the grammar supplying formats and lexicons.
    pub grammar: String,
}

impl Scheme {
    pub fn new(code: impl Into<String>, base: Base, grammar: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: String::new(),
            base,
            grammar: grammar.into(),
        }
    }

    /// Resolve a format code (or the grammar's default) to a format.
    fn format(
        &self,
        ctx: &TextContext,
        fcode: Option<&str>,
        output: bool,
    ) -> Result<Rc<Format>, String> {
        let grammar = ctx
            .grammars
            .get(&self.grammar)
            .ok_or_else(|| format!("grammar \"{}\" not found.", self.grammar))?;
        let fcode = match fcode {
            Some(f) => f.to_string(),
            None if output => grammar.output_format.clone(),
            None => grammar.input_format.clone(),
        };
        ctx.formats
            .get(&grammar.format_key(&fcode))
            .cloned()
            .ok_or_else(|| format!("format \"{}:{}\" not found.", self.grammar, fcode))
    }

    fn render(&self, ctx: &TextContext, format: &Format, fields: &[Field]) -> String {
        format.render(&self.base.field_names(), fields, ctx.lexicons)
    }

    /// Render a (possibly partial) field tuple directly.
    pub fn fields_to_text(
        &self,
        ctx: &TextContext,
        fields: &[Field],
        fcode: Option<&str>,
    ) -> Result<String, String> {
        let format = self.format(ctx, fcode, true)?;
        Ok(self.render(ctx, &format, fields))
    }

    pub fn jdn_to_text(
        &self,
        ctx: &TextContext,
        jdn: Field,
        fcode: Option<&str>,
    ) -> Result<String, String> {
        match jdn {
            F_INVALID => Ok("?".to_string()),
            F_MINIMUM => Ok("past".to_string()),
            F_MAXIMUM => Ok("future".to_string()),
            _ => {
                let format = self.format(ctx, fcode, true)?;
                Ok(self.render(ctx, &format, &self.base.get_fields(jdn)))
            }
        }
    }

    /// The shortest field prefix whose begin (or end) completion lands
    /// exactly on the day, rendered; a month-start day renders as the
    /// month when used as a range begin.
    fn side_text(
        &self,
        ctx: &TextContext,
        format: &Format,
        jdn: Field,
        use_end: bool,
    ) -> Result<String, String> {
        match jdn {
            F_INVALID => return Ok("?".to_string()),
            F_MINIMUM => return Ok("past".to_string()),
            F_MAXIMUM => return Ok("future".to_string()),
            _ => {}
        }
        let fields = self.base.get_fields(jdn);
        let required = self.base.required();
        for n in 1..=required {
            let mut prefix = vec![F_INVALID; required];
            prefix[..n].copy_from_slice(&fields[..n]);
            let range = self.base.complete_range(&prefix);
            if !range.is_invalid() && (if use_end { range.end } else { range.beg }) == jdn {
                return Ok(self.render(ctx, format, &prefix));
            }
        }
        Ok(self.render(ctx, format, &fields))
    }

    pub fn range_to_text(
        &self,
        ctx: &TextContext,
        range: Range,
        fcode: Option<&str>,
    ) -> Result<String, String> {
        if range.beg == range.end {
            return self.jdn_to_text(ctx, range.beg, fcode);
        }
        let format = self.format(ctx, fcode, true)?;
        // A range covering one partial date renders as that date.
        if range.beg > F_MINIMUM && range.end < F_MAXIMUM {
            let fields = self.base.get_fields(range.beg);
            let required = self.base.required();
            for n in 1..required {
                let mut prefix = vec![F_INVALID; required];
                prefix[..n].copy_from_slice(&fields[..n]);
                if self.base.complete_range(&prefix) == range {
                    return Ok(self.render(ctx, &format, &prefix));
                }
            }
        }
        let beg = self.side_text(ctx, &format, range.beg, false)?;
        let end = self.side_text(ctx, &format, range.end, true)?;
        Ok(format!("{}..{}", beg, end))
    }

    pub fn rlist_to_text(
        &self,
        ctx: &TextContext,
        rlist: &RangeList,
        fcode: Option<&str>,
    ) -> Result<String, String> {
        if rlist.is_empty() {
            return Ok("empty".to_string());
        }
        let parts: Result<Vec<String>, String> = rlist
            .iter()
            .map(|&range| self.range_to_text(ctx, range, fcode))
            .collect();
        Ok(parts?.join(" | "))
    }

    /// Parse one date string to its partial field tuple.
    pub fn text_to_fields(
        &self,
        ctx: &TextContext,
        text: &str,
        fcode: Option<&str>,
    ) -> Result<Vec<Field>, String> {
        let format = self.format(ctx, fcode, false)?;
        Ok(format.parse(&self.base.field_names(), text, ctx.lexicons))
    }

    /// Parse one segment, optionally `begin..end`, to a range.
    pub fn text_to_range(
        &self,
        ctx: &TextContext,
        text: &str,
        fcode: Option<&str>,
    ) -> Result<Range, String> {
        let text = text.trim();
        if let Some((left, right)) = text.split_once("..") {
            let beg = self.side_jdn(ctx, left.trim(), fcode, false)?;
            let end = self.side_jdn(ctx, right.trim(), fcode, true)?;
            if beg == F_INVALID || end == F_INVALID {
                return Err(format!("cannot parse date \"{}\".", text));
            }
            return Ok(Range::new(beg, end));
        }
        let fields = self.text_to_fields(ctx, text, fcode)?;
        let range = self.base.complete_range(&fields);
        if range.is_invalid() {
            return Err(format!("cannot parse date \"{}\".", text));
        }
        Ok(range)
    }

    fn side_jdn(
        &self,
        ctx: &TextContext,
        text: &str,
        fcode: Option<&str>,
        use_end: bool,
    ) -> Result<Field, String> {
        match text {
            "past" => return Ok(F_MINIMUM),
            "future" => return Ok(F_MAXIMUM),
            _ => {}
        }
        let fields = self.text_to_fields(ctx, text, fcode)?;
        let range = self.base.complete_range(&fields);
        Ok(if use_end { range.end } else { range.beg })
    }

    /// Parse a full `|`-separated range list and well-order it.
    pub fn text_to_rlist(
        &self,
        ctx: &TextContext,
        text: &str,
        fcode: Option<&str>,
    ) -> Result<RangeList, String> {
        let mut rlist = RangeList::new();
        for segment in text.split('|') {
            let segment = segment.trim();
            if segment.is_empty() || segment == "empty" {
                continue;
            }
            rlist.push(self.text_to_range(ctx, segment, fcode)?);
        }
        Ok(well_order(rlist))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hics::lexicon::Lexicon;

    struct Fixture {
        lexicons: LexiconMap,
        formats: HashMap<String, Rc<Format>>,
        grammars: HashMap<String, Rc<Grammar>>,
        scheme: Scheme,
    }

    impl Fixture {
        fn ctx(&self) -> TextContext<'_> {
            TextContext {
                lexicons: &self.lexicons,
                formats: &self.formats,
                grammars: &self.grammars,
            }
        }
    }

    fn english() -> Fixture {
        let mut lex = Lexicon::new("m");
        lex.fieldname = "month".to_string();
        let names = [
            "January", "February", "March", "April", "May", "June", "July", "August",
            "September", "October", "November", "December",
        ];
        for (i, name) in names.iter().enumerate() {
            lex.add_token(i as Field + 1, *name, Some(name[..3].to_string()));
        }
        let mut lexicons = LexiconMap::new();
        lexicons.insert("m".to_string(), Rc::new(lex));

        let mut grammar = Grammar::new("g");
        grammar.lexicons.push("m".to_string());
        grammar.formats = vec!["dmy".to_string(), "mdy".to_string()];
        grammar.input_format = "dmy".to_string();
        grammar.output_format = "dmy".to_string();
        let mut grammars = HashMap::new();
        grammars.insert("g".to_string(), Rc::new(grammar));

        let mut formats = HashMap::new();
        formats.insert(
            "g:dmy".to_string(),
            Rc::new(Format::new("dmy", "{day} |{month:m:a} |{year}").unwrap()),
        );
        formats.insert(
            "g:mdy".to_string(),
            Rc::new(Format::new("mdy", "{month:m:a} |{day}, |{year}").unwrap()),
        );

        Fixture {
            lexicons,
            formats,
            grammars,
            scheme: Scheme::new("g", Base::Gregorian, "g"),
        }
    }

    #[test]
    fn test_text_to_field() {
        let f = english();
        let range = f.scheme.text_to_range(&f.ctx(), "19aug2023", None).unwrap();
        assert_eq!(range, Range { beg: 2460176, end: 2460176 });
    }

    #[test]
    fn test_field_to_text() {
        let f = english();
        let text = f.scheme.jdn_to_text(&f.ctx(), 2460176, Some("mdy")).unwrap();
        assert_eq!(text, "Aug 19, 2023");
    }

    #[test]
    fn test_year_round_trip() {
        let f = english();
        let range = f.scheme.text_to_range(&f.ctx(), "1948", None).unwrap();
        assert_eq!(range, Range { beg: 2432552, end: 2432917 });
        let text = f.scheme.range_to_text(&f.ctx(), range, None).unwrap();
        assert_eq!(text, "1948");
    }

    #[test]
    fn test_rlist_well_orders() {
        let f = english();
        let rlist = f
            .scheme
            .text_to_rlist(
                &f.ctx(),
                "30aug2023 | 1800..1837 | may2030..future | past..1756",
                None,
            )
            .unwrap();
        let text = f.scheme.rlist_to_text(&f.ctx(), &rlist, None).unwrap();
        assert_eq!(
            text,
            "past..1756 | 1800..1837 | 30 Aug 2023 | May 2030..future"
        );
    }

    #[test]
    fn test_sentinel_rendering() {
        let f = english();
        assert_eq!(f.scheme.jdn_to_text(&f.ctx(), F_INVALID, None).unwrap(), "?");
        assert_eq!(f.scheme.jdn_to_text(&f.ctx(), F_MINIMUM, None).unwrap(), "past");
        assert_eq!(f.scheme.rlist_to_text(&f.ctx(), &RangeList::new(), None).unwrap(), "empty");
    }

    #[test]
    fn test_unparseable_text_errors() {
        let f = english();
        assert!(f.scheme.text_to_range(&f.ctx(), "fish", None).is_err());
    }
}
