//! End-to-end assembly: operating system plus user program, through every stage.

use pepasm::driver::TargetKind;
use pepasm::format::{FormatConfig, hex_listing, listing};
use pepasm::pep10::{self, Features, Pep10Pipeline, Stage};

const OS: &str = "\
.EXPORT charIn
.SCALL DECI
.ORG 0x8000
DECI:    RET
charIn:  .BLOCK 1
";

const USER: &str = "\
main: @DECI 0,i
      LDBA charIn,d
      RET
";

fn assemble(os: Option<&str>, user: &str, features: Features) -> (Pep10Pipeline, bool) {
    let mut p = pep10::pipeline();
    if let Some(os) = os {
        pep10::add_os(&mut p, os, features);
    }
    pep10::add_user(&mut p, user, features);
    let ok = p.assemble();
    (p, ok)
}

fn messages(p: &Pep10Pipeline, kind: TargetKind) -> Vec<String> {
    let target = p.target(kind).expect("target present");
    pep10::errors(target).into_iter().map(|e| e.message).collect()
}

#[test]
fn test_os_and_user_reach_the_end() {
    let (p, ok) = assemble(Some(OS), USER, Features::default());
    assert!(ok, "{:?}", messages(&p, TargetKind::User));
    let kinds: Vec<_> = p.targets().iter().map(|t| (t.kind, t.stage)).collect();
    assert_eq!(kinds, [(TargetKind::Os, Stage::End), (TargetKind::User, Stage::End)]);
}

#[test]
fn test_os_listing() {
    let (p, ok) = assemble(Some(OS), USER, Features::default());
    assert!(ok);
    let os = p.target(TargetKind::Os).expect("os target");
    let rows = listing(pep10::lines(os), &p.globals.symbols, &FormatConfig::default());
    assert_eq!(
        rows,
        [
            "                      .EXPORT charIn",
            "                      .SCALL  DECI",
            "                      .ORG    0x8000",
            "8000  01     DECI:    RET",
            "8001  00     charIn:  .BLOCK  1",
        ]
    );
}

#[test]
fn test_system_call_expands_in_user_listing() {
    let (p, ok) = assemble(Some(OS), USER, Features::default());
    assert!(ok);
    let user = p.target(TargetKind::User).expect("user target");
    let rows = listing(pep10::lines(user), &p.globals.symbols, &FormatConfig::default());
    assert_eq!(
        rows,
        [
            "             ;@DECI 0,i",
            "0000  C08000 main:    LDWA    DECI,i",
            "0003  380000          SCALL   0,i",
            "             ;End @DECI",
            "0006  D18001          LDBA    charIn,d",
            "0009  01              RET",
        ]
    );
}

#[test]
fn test_user_hex_listing_snapshot() {
    let (p, ok) = assemble(Some(OS), USER, Features::default());
    assert!(ok);
    let user = p.target(TargetKind::User).expect("user target");
    let rows = hex_listing(pep10::lines(user), &p.globals.symbols).join("\n");
    insta::assert_snapshot!(rows, @r"
    0000     C0 80 00
    0003     38 00 00
    0006     D1 80 01
    0009     01
    ");
}

#[test]
fn test_user_object_json_snapshot() {
    let (p, ok) = assemble(Some(OS), USER, Features::default());
    assert!(ok);
    let user = p.target(TargetKind::User).expect("user target");
    let object = pep10::object(user).expect("object body");
    let json = serde_json::to_string_pretty(&object.to_json()).expect("json renders");
    insta::assert_snapshot!(json, @r#"
    {
      "mmio": [],
      "sections": [
        {
          "address": 0,
          "flags": "rwx",
          "name": ".text",
          "size": 10
        }
      ],
      "symbols": [
        {
          "binding": "imported",
          "name": "DECI",
          "size": 1,
          "type": "code",
          "value": 32768
        },
        {
          "binding": "imported",
          "name": "charIn",
          "size": 1,
          "type": "object",
          "value": 32769
        },
        {
          "binding": "local",
          "name": "main",
          "size": 3,
          "type": "code",
          "value": 0
        }
      ],
      "system_calls": []
    }
    "#);
}

#[test]
fn test_os_object_lists_system_calls() {
    let (p, ok) = assemble(Some(OS), USER, Features::default());
    assert!(ok);
    let os = p.target(TargetKind::Os).expect("os target");
    let object = pep10::object(os).expect("object body");
    assert_eq!(object.system_calls, ["DECI"]);
    assert_eq!(object.bytes(), [0x01, 0x00]);
    assert_eq!(object.sections[0].address, 0x8000);
    assert_eq!(object.to_pepo(), "01 00 \nzz\n");
}

#[test]
fn test_system_call_without_os_is_unknown() {
    let (p, ok) = assemble(None, USER, Features::default());
    assert!(!ok);
    assert_eq!(messages(&p, TargetKind::User), ["Macro @DECI does not exist."]);
    let user = p.target(TargetKind::User).expect("user target");
    assert_eq!(user.stage, Stage::IncludeMacros);
}

#[test]
fn test_user_may_not_export() {
    let (p, ok) = assemble(Some(OS), ".EXPORT main\nmain: RET\n", Features::default());
    assert!(!ok);
    assert_eq!(
        messages(&p, TargetKind::User),
        ["Only operating systems may use .EXPORT."]
    );
    assert_eq!(p.target(TargetKind::Os).map(|t| t.stage), Some(Stage::End));
}

#[test]
fn test_redefining_an_os_export_is_external_multiple() {
    let (p, ok) = assemble(Some(OS), "charIn: .BYTE 1\n", Features::default());
    assert!(!ok);
    assert_eq!(messages(&p, TargetKind::User), ["Multiply defined symbol charIn."]);
}

#[test]
fn test_ignore_undefined_encodes_zero() {
    let features = Features {
        ignore_undefined_symbols: true,
        ..Features::default()
    };
    let (p, ok) = assemble(None, "LDWA later,d\n", features);
    assert!(ok);
    let user = p.target(TargetKind::User).expect("user target");
    assert_eq!(pep10::object(user).expect("object body").bytes(), [0xC1, 0x00, 0x00]);

    let (p, ok) = assemble(None, "LDWA later,d\n", Features::default());
    assert!(!ok);
    assert_eq!(messages(&p, TargetKind::User), ["Undefined symbol later."]);
}

#[test]
fn test_syntax_errors_keep_start_stage() {
    let (p, ok) = assemble(None, "LDWA 1\nRET\n", Features::default());
    assert!(!ok);
    let user = p.target(TargetKind::User).expect("user target");
    assert_eq!(user.stage, Stage::Start);
    let errors = pep10::errors(user);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "This mnemonic requires an addressing mode.");
    assert_eq!(errors[0].interval.map(|i| i.lower().row), Some(0));
}

#[test]
fn test_stepwise_assembly_resumes() {
    let mut p = pep10::pipeline();
    pep10::add_user(&mut p, "x: .WORD 7\n", Features::default());
    assert!(p.assemble_to(Stage::GroupNodes));
    assert_eq!(p.targets()[0].stage, Stage::RegisterExports);
    assert!(pep10::object(&p.targets()[0]).is_none());
    assert!(p.assemble());
    assert_eq!(p.targets()[0].stage, Stage::End);
    assert_eq!(pep10::object(&p.targets()[0]).expect("object body").bytes(), [0x00, 0x07]);
}
