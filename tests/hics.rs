use glich::{run, Runtime, Value};

#[test]
fn test_library_loads_clean() {
    let mut rt = Runtime::new();
    assert_eq!(rt.load_hics_library(), "");
}

#[test]
fn test_default_gregorian_round_trip() {
    assert_eq!(run("write date \"19aug2023\";"), "2460176");
    assert_eq!(run("write text date \"19aug2023\";"), "19 Aug 2023");
    assert_eq!(run("write text 2460176f;"), "19 Aug 2023");
}

#[test]
fn test_format_signature_selects_output() {
    assert_eq!(run("write text.g:mdy date \"19aug2023\";"), "Aug 19, 2023");
}

#[test]
fn test_hics_context_types_bare_integers() {
    assert_eq!(run("set context hics; write text 2460176;"), "19 Aug 2023");
}

#[test]
fn test_date_arithmetic() {
    assert_eq!(run("write text (date \"19aug2023\" + 7);"), "26 Aug 2023");
    assert_eq!(
        run("write date \"19aug2023\" - date \"1jan2023\";"),
        "230"
    );
}

#[test]
fn test_partial_dates_become_ranges() {
    assert_eq!(run("write date \"1948\";"), "2432552..2432917");
    assert_eq!(run("write text date \"1948\";"), "1948");
    assert_eq!(run("write text date \"may2030..future\";"), "May 2030..future");
    assert_eq!(run("write text date \"past..1756\";"), "past..1756");
}

#[test]
fn test_rlist_text_round_trip() {
    let source = "write text date \"30aug2023 | 1800..1837 | may2030..future | past..1756\";";
    assert_eq!(
        run(source),
        "past..1756 | 1800..1837 | 30 Aug 2023 | May 2030..future"
    );
}

#[test]
fn test_empty_and_invalid_spellings() {
    assert_eq!(run("write text (date \"1948\" & date \"1950\");"), "?");
    assert_eq!(run("write text empty;"), "empty");
}

#[test]
fn test_record_cast() {
    let source = r#"
        let r = record "19aug2023";
        write r[1], "-", r[2], "-", r[3], " ", text r;
    "#;
    assert_eq!(run(source), "2023-8-19 19 Aug 2023");
}

#[test]
fn test_partial_record_renders_partially() {
    assert_eq!(run("write text record \"aug2023\";"), "Aug 2023");
}

#[test]
fn test_element_cast() {
    assert_eq!(run("write element.m 8;"), "August");
    assert_eq!(run("write element.m:a 8;"), "Aug");
    assert_eq!(run("write element.m \"August\";"), "8");
    assert_eq!(run("write element.w 3;"), "Wednesday");
}

#[test]
fn test_julian_scheme() {
    // The Julian calendar runs 13 days behind through the 20th and
    // 21st centuries.
    assert_eq!(run("write text.j date \"19aug2023\";"), "6 Aug 2023");
    assert_eq!(run("write date.j \"6aug2023\";"), "2460176");
}

#[test]
fn test_jdn_scheme() {
    assert_eq!(run("write text.jdn date \"19aug2023\";"), "2460176");
    assert_eq!(run("write date.jdn \"2460176\";"), "2460176");
}

#[test]
fn test_hebrew_scheme() {
    assert_eq!(run("write text.h date \"16sep2023\";"), "1 Tishri 5784");
    assert_eq!(run("write date.h \"1 Tishri 5784\";"), "2460204");
    // A whole hebrew year runs Tishri through Elul.
    assert_eq!(run("write text date.h \"5784\";"), "16 Sep 2023..2 Oct 2024");
}

#[test]
fn test_islamic_scheme() {
    assert_eq!(run("write text date.i \"1 Ramadan 1444\";"), "22 Mar 2023");
    assert_eq!(run("write text.i date \"22mar2023\";"), "1 Ramadan 1444");
}

#[test]
fn test_french_scheme() {
    assert_eq!(run("write text.fr date \"22sep1792\";"), "1 Vendemiaire 1");
    assert_eq!(run("write date.fr \"1 Vendemiaire 1\";"), "2375840");
}

#[test]
fn test_iso_week_scheme() {
    assert_eq!(run("write text.isow date \"1jan2024\";"), "2024 1 Mon");
    assert_eq!(run("write text date.isow \"2024 1 Mon\";"), "1 Jan 2024");
}

#[test]
fn test_iso_ordinal_scheme() {
    assert_eq!(run("write text.iso date \"1jan2024\";"), "2024 1");
    assert_eq!(run("write text.iso date \"31dec2024\";"), "2024 366");
}

#[test]
fn test_julian_week_number_scheme() {
    assert_eq!(run("write text.jwn date \"1jan2024\";"), "351473 Mon");
    assert_eq!(run("write text date.jwn \"351473 Mon\";"), "1 Jan 2024");
}

#[test]
fn test_chinese_scheme_round_trips() {
    let source = r#"
        let d = date "19aug2023";
        write @if(date.c text.c d = d, "ok", "bad");
    "#;
    assert_eq!(run(source), "ok");
}

#[test]
fn test_hybrid_changeover() {
    // The ay scheme follows Julian dates up to the 1582 reform, then
    // Gregorian: the day after 4 Oct 1582 is 15 Oct 1582.
    assert_eq!(
        run("write text.ay date.jdn \"2299160..2299161\";"),
        "4 Oct 1582..15 Oct 1582"
    );
    assert_eq!(run("write date.ay \"4oct1582\";"), "2299160");
    assert_eq!(run("write date.ay \"15oct1582\";"), "2299161");
}

#[test]
fn test_set_inout_changes_defaults() {
    let source = r#"
        set inout j;
        write text date "6aug2023";
    "#;
    assert_eq!(run(source), "6 Aug 2023");
}

#[test]
fn test_clear_restores_signatures() {
    let mut rt = Runtime::new();
    rt.load_hics_library();
    let out = rt.run_script(
        r#"
        mark m;
        set inout j;
        clear m;
        write text date "19aug2023";
        "#,
    );
    assert_eq!(out, "19 Aug 2023");
}

#[test]
fn test_user_defined_scheme() {
    let source = r#"
        lexicon qm {
            name "Quarter names";
            fieldname month;
            tokens {
                1, "Winter"; 4, "Spring"; 7, "Summer"; 10, "Autumn";
            }
        }
        grammar q {
            lexicons qm;
            format my "{month:qm} |{year}";
            input my;
            output my;
        }
        scheme q {
            name "Quarters";
            base gregorian;
            grammar q;
        }
        write text.q date "19jul2023";
    "#;
    assert_eq!(run(source), "Summer 2023");
}

#[test]
fn test_date_phrase_evaluation() {
    let mut rt = Runtime::new();
    rt.load_hics_library();
    let expression = glich::phrase::parse_date_phrase("\"1948\" | \"1950..1956\"");
    let value = rt.evaluate(&expression);
    match value {
        Value::RangeList(list) => assert_eq!(list.len(), 2),
        v => panic!("expected rlist, got {:?}", v),
    }
}
