#[macro_use]
mod utils;

use analog_ensemble::Operation;

check_thread_independence!(independent_threads, Operation::Independent, 0);
check_thread_independence!(space_extended_threads, Operation::SpaceExtended, 2);
