mod runtime;

mod test_mock;
mod test_submit;
