mod helpers;
mod intake;
mod proposals;
