//! Hics: the calendar extension
//!
//! Calendar bases convert between the canonical julian day number and
//! per-calendar field tuples; lexicons, formats, grammars and schemes
//! turn those tuples into text and back. The bundled library below is
//! itself a script, run by the runtime at load time, so the standard
//! schemes are defined with exactly the same machinery user scripts
//! use.

pub mod astro;
pub mod base;
pub mod chinese;
pub mod format;
pub mod french;
pub mod grammar;
pub mod hebrew;
pub mod hybrid;
pub mod islamic;
pub mod isoweek;
pub mod julian;
pub mod lexicon;
pub mod math;
pub mod scheme;

/// The standard calendar definitions, loaded under the bottom mark.
pub const HICS_LIBRARY: &str = r#"
lexicon m {
    name "Month names";
    fieldname month;
    tokens {
        1, "January", "Jan";
        2, "February", "Feb";
        3, "March", "Mar";
        4, "April", "Apr";
        5, "May";
        6, "June", "Jun";
        7, "July", "Jul";
        8, "August", "Aug";
        9, "September", "Sep";
        10, "October", "Oct";
        11, "November", "Nov";
        12, "December", "Dec";
    }
}
lexicon w {
    name "Weekday names";
    fieldname wday;
    tokens {
        1, "Monday", "Mon";
        2, "Tuesday", "Tue";
        3, "Wednesday", "Wed";
        4, "Thursday", "Thu";
        5, "Friday", "Fri";
        6, "Saturday", "Sat";
        7, "Sunday", "Sun";
    }
}
grammar d {
    name "Day count";
    format d "{day}";
    input d;
    output d;
}
grammar g {
    name "European year month day";
    lexicons m, w;
    format dmy "{day} |{month:m:a} |{year}";
    format mdy "{month:m:a} |{day}, |{year}";
    input dmy;
    output dmy;
}
scheme jdn {
    name "Julian Day Number";
    base jdn;
    grammar d;
}
scheme j {
    name "Julian";
    base julian;
    grammar g;
}
scheme g {
    name "Gregorian";
    base gregorian;
    grammar g;
}
scheme ay {
    name "Astronomical Year";
    base hybrid j 2299161 g;
    grammar g;
}
lexicon hm {
    name "Hebrew month names";
    fieldname month;
    tokens {
        1, "Nisan";
        2, "Iyyar";
        3, "Sivan";
        4, "Tammuz";
        5, "Av";
        6, "Elul";
        7, "Tishri";
        8, "Marheshvan";
        9, "Kislev";
        10, "Tevet";
        11, "Shevat";
        12, "Adar";
        13, "Adar II", "AdarII";
    }
}
grammar h {
    name "Hebrew year month day";
    lexicons hm;
    format dmy "{day} |{month:hm} |{year}";
    input dmy;
    output dmy;
}
scheme h {
    name "Hebrew";
    base hebrew;
    grammar h;
}
lexicon im {
    name "Islamic month names";
    fieldname month;
    tokens {
        1, "Muharram";
        2, "Safar";
        3, "RabiI";
        4, "RabiII";
        5, "JumadaI";
        6, "JumadaII";
        7, "Rajab";
        8, "Shaban";
        9, "Ramadan";
        10, "Shawwal";
        11, "DhualQidah";
        12, "DhualHijjah";
    }
}
grammar i {
    name "Islamic year month day";
    lexicons im;
    format dmy "{day} |{month:im} |{year}";
    input dmy;
    output dmy;
}
scheme i {
    name "Islamic Tabular";
    base islamic IIc;
    grammar i;
}
grammar c {
    name "Chinese cycle year month day";
    format cymd "{cycle} |{cyear} |{month} |{lmonth} |{day}";
    input cymd;
    output cymd;
}
scheme c {
    name "Chinese";
    base chinese;
    grammar c;
}
lexicon frm {
    name "French Republican month names";
    fieldname month;
    tokens {
        1, "Vendemiaire";
        2, "Brumaire";
        3, "Frimaire";
        4, "Nivose";
        5, "Pluviose";
        6, "Ventose";
        7, "Germinal";
        8, "Floreal";
        9, "Prairial";
        10, "Messidor";
        11, "Thermidor";
        12, "Fructidor";
        13, "Complementaires", "Comp";
    }
}
grammar fr {
    name "French Republican year month day";
    lexicons frm;
    format dmy "{day} |{month:frm} |{year}";
    input dmy;
    output dmy;
}
scheme fr {
    name "French Republican";
    base french;
    grammar fr;
}
grammar isow {
    name "ISO week";
    lexicons w;
    format ywd "{year} |{week} |{wday:w:a}";
    input ywd;
    output ywd;
}
scheme isow {
    name "ISO:8601 Week";
    base isoweek;
    grammar isow;
}
grammar iso {
    name "ISO ordinal";
    format yd "{year} |{day}";
    input yd;
    output yd;
}
scheme iso {
    name "ISO:8601 Ordinal";
    base ordinal;
    grammar iso;
}
grammar jwn {
    name "Julian week number";
    lexicons w;
    format wd "{week} |{day:w:a}";
    input wd;
    output wd;
}
scheme jwn {
    name "Julian Week Number";
    base jwn;
    grammar jwn;
}
"#;
