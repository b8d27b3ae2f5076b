mod proximity;
mod tree;

#[ctor::ctor]
fn init() {
    colog::init();
}
