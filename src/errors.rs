// Create the Error, ErrorKind, ResultExt, and Result types
// Result is a typedef of std `Result` with the error type our own `Error`
// Defines the From conversions that let ? work for our `Error`.
use error_chain::*;

error_chain! {

    errors {
        InvalidConfiguration(reason: String) {
            description("invalid maze configuration")
            display("invalid maze configuration: {}", reason)
        }

        UnknownSolverType(identifier: String) {
            description("unknown solver type")
            display("unknown solver type: '{}'", identifier)
        }
    }
}
