// Receiver
//------------------------------------------------------------------------------

/// A host element that can supply a message or receive a result, such as an
/// input field, a text area or any element whose content can be replaced.
pub trait Receiver {
    fn value(&self) -> String;

    fn set_value(&mut self, value: &str);
}

impl Receiver for String {
    fn value(&self) -> String {
        self.clone()
    }

    fn set_value(&mut self, value: &str) {
        self.clear();
        self.push_str(value);
    }
}

#[cfg(test)]
mod receiver_tests {
    use super::Receiver;

    #[test]
    fn test_string_receiver() {
        let mut s = "old".to_string();
        s.set_value("new");
        assert_eq!(s.value(), "new");
    }
}
