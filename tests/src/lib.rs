//! End-to-end tests for the orchestration core, driven through stub and
//! real engine runners.

#[cfg(test)]
mod orchestration;
#[cfg(test)]
mod process;
#[cfg(test)]
mod support;
