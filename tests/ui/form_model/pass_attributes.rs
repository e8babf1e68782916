use contactus::form::{FieldLens, FormModel};

#[allow(dead_code)]
#[derive(Clone, contactus::form::FormModel)]
struct FeedbackForm {
    #[form(rename = "reply_to")]
    email: String,
    rating: u8,
    #[form(skip)]
    draft_id: u64,
}

fn main() {
    let fields = FeedbackForm::fields();
    assert_eq!(fields.email().key().as_str(), "reply_to");
    assert_eq!(fields.rating().key().as_str(), "rating");

    let keys = FeedbackForm::field_keys()
        .iter()
        .map(|key| key.as_str())
        .collect::<Vec<_>>();
    assert_eq!(keys, ["reply_to", "rating"]);
}
