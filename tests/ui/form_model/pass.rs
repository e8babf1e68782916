use contactus::form::{FieldLens, FormModel};

#[derive(Clone, contactus::form::FormModel)]
struct DemoForm {
    email: String,
}

fn main() {
    let fields = DemoForm::fields();
    let lens = fields.email();
    let mut model = DemoForm {
        email: "a@example.com".to_string(),
    };
    lens.set(&mut model, "b@example.com".to_string());
    assert_eq!(lens.key().as_str(), "email");
    assert_eq!(lens.get(&model), "b@example.com");
}
