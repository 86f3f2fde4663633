use super::*;
use std::cell::RefCell;
use std::rc::Rc;
use weft_core::Slot;

fn record_names(model: &EditorViewModel) -> Rc<RefCell<Vec<&'static str>>> {
    let names = Rc::new(RefCell::new(Vec::new()));
    let slot: Slot<EditorViewModel, PropertyChangedArgs> = {
        let names = names.clone();
        Rc::new(move |_: &EditorViewModel, args: &PropertyChangedArgs| {
            names.borrow_mut().push(args.name());
        })
    };
    model.state_changed().connect(&slot);
    names
}

#[test]
fn defaults_match_a_fresh_editor() {
    let model = EditorViewModel::new();
    assert_eq!(model.config(), EditorConfig::default());
    assert!(model.line_numbers());
    assert_eq!(model.tab_size(), 4);
}

#[test]
fn every_field_notifies_state_changed() {
    let model = EditorViewModel::new();
    let names = record_names(&model);

    model.set_text("fn main() {}");
    model.set_mimetype("text/x-rustsrc");
    model.set_filename("main.rs");
    model.set_fixed_height(true);
    model.set_line_numbers(false);
    model.set_read_only(true);
    model.set_tab_size(2);

    assert_eq!(
        *names.borrow(),
        vec![
            "text",
            "mimetype",
            "filename",
            "fixedHeight",
            "lineNumbers",
            "readOnly",
            "tabSize"
        ]
    );
}

#[test]
fn setting_the_same_value_is_silent() {
    let model = EditorViewModel::new();
    let names = record_names(&model);

    model.set_tab_size(4);
    model.set_line_numbers(true);
    model.set_text("");

    assert!(names.borrow().is_empty());
}

#[test]
fn change_args_carry_typed_values() {
    let model = EditorViewModel::new();
    model.set_tab_size(8);
    let seen = Rc::new(RefCell::new(None));
    let slot: Slot<EditorViewModel, PropertyChangedArgs> = {
        let seen = seen.clone();
        Rc::new(move |_: &EditorViewModel, args: &PropertyChangedArgs| {
            *seen.borrow_mut() = Some((
                args.old_value::<u32>().copied(),
                args.new_value::<u32>().copied(),
            ));
        })
    };
    model.state_changed().connect(&slot);

    model.set_tab_size(2);
    assert_eq!(*seen.borrow(), Some((Some(8), Some(2))));
}

#[test]
fn from_config_copies_all_fields() {
    let config = EditorConfig::default()
        .with_text("print(1)")
        .with_filename("a.py")
        .with_read_only(true)
        .with_tab_size(2);
    let model = EditorViewModel::from_config(&config);
    assert_eq!(model.config(), config);
}

#[test]
fn dispose_resets_fields_and_connections() {
    let model = EditorViewModel::new();
    model.set_text("draft");
    let names = record_names(&model);

    model.dispose();
    assert_eq!(model.text(), "");
    model.set_text("again");
    assert!(names.borrow().is_empty());
}
